//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file named by WEBHOOK_CONFIG (loader.rs)
//!     → environment overrides: PORT, RATE_LIMIT, API_TOKEN, ... (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ReceiverConfig (validated, immutable)
//! ```
//!
//! Config is resolved once at startup. Nothing re-reads the environment
//! while serving requests.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AlertConfig, AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitConfig,
    ReceiverConfig,
};
pub use validation::ValidationError;
