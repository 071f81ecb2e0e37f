//! Admission control for the webhook route.
//!
//! # Data Flow
//! ```text
//! POST /test:
//!     → rate_limit.rs (count per client IP, reject over budget)
//!     → auth.rs (compare x-api-token with the configured secret)
//!     → webhook handler
//! GET /health bypasses both.
//! ```

pub mod auth;
pub mod rate_limit;

pub use auth::{require_api_token, TokenAuth, API_TOKEN_HEADER};
pub use rate_limit::{rate_limit_middleware, spawn_window_reset, Decision, FixedWindowLimiter, WINDOW};
