//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign X-Request-ID)
//!     → request span + access log (tower-http trace)
//!     → security (rate limit, token) for POST /test
//!     → handlers.rs (payload.rs extracts the alert)
//!     → response.rs (acknowledgement or error body)
//! ```

pub mod handlers;
pub mod payload;
pub mod request;
pub mod response;
pub mod server;

pub use payload::AlertPayload;
pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::{Ack, ApiError, ErrorBody};
pub use server::{build_router, with_common_layers, AppState, HttpServer};
