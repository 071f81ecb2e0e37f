//! Alert webhook receiver.
//!
//! ```text
//!  POST /test ──▶ request id ──▶ rate limit ──▶ token ──▶ handler ──▶ 200 ack
//!                                    │             │          │
//!                                   429           401         └──▶ (firing) afplay, detached
//!
//!  GET /health ──▶ request id ──▶ 200 {"status":"ok"}
//! ```
//!
//! Configuration comes from the environment (and an optional `.env` file),
//! see [`alert_webhook::config`].

use std::net::SocketAddr;

use tokio::net::TcpListener;

use alert_webhook::config::load_from_env;
use alert_webhook::lifecycle::{wait_for_termination, Shutdown};
use alert_webhook::observability::{init_logging, metrics};
use alert_webhook::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = load_from_env()?;
    init_logging(&config.observability);

    tracing::info!("alert-webhook v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.bind_address(),
        rate_limit = config.rate_limit.max_requests,
        alert_sound = %config.alert.sound,
        alert_volume = %config.alert.volume,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %addr, error = %e, "Failed to parse metrics address"),
        }
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        address = %local_addr,
        "Listening on http://localhost:{}/test",
        local_addr.port()
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = tokio::spawn(async move {
        let signal = wait_for_termination().await;
        tracing::info!(signal, "Received termination signal, shutting down");
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
