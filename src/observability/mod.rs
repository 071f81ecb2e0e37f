//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! The request id is a field of every request span, so each log line of a
//! request can be correlated with the `X-Request-ID` the caller got back.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
