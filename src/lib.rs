//! Alert webhook receiver library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod security;

pub use config::schema::ReceiverConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
