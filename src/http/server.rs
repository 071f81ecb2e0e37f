//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with both routes
//! - Wire up middleware (request ID, tracing, panic catching)
//! - Protect the webhook route with rate limiting and token auth
//! - Run the rate limit window reset alongside the server
//! - Serve until the shutdown signal, then drain

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::config::ReceiverConfig;
use crate::http::handlers;
use crate::http::request::{assign_request_id, RequestIdExt};
use crate::http::response::handle_panic;
use crate::notify::{platform_notifier, AlertDispatcher, AlertSound, Notifier};
use crate::security::{
    rate_limit_middleware, require_api_token, spawn_window_reset, FixedWindowLimiter, TokenAuth,
    WINDOW,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<FixedWindowLimiter>,
    pub auth: Arc<TokenAuth>,
    pub alerts: AlertDispatcher,
}

impl AppState {
    pub fn new(config: &ReceiverConfig, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            limiter: Arc::new(FixedWindowLimiter::new(config.rate_limit.max_requests)),
            auth: Arc::new(TokenAuth::new(config.auth.api_token.clone())),
            alerts: AlertDispatcher::new(notifier, AlertSound::from(&config.alert)),
        }
    }
}

/// Build the router with all middleware layers.
///
/// Requests need a `ConnectInfo<SocketAddr>` extension for the rate limiter;
/// [`HttpServer::run`] provides it.
pub fn build_router(state: AppState) -> Router {
    // Rate limit runs first, so rejected tokens still spend quota.
    let webhook = Router::new()
        .route("/test", post(handlers::receive_alert))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_api_token,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(webhook)
        .with_state(state);

    with_common_layers(app)
}

/// Request id, request span, and panic catching, applied to every route.
pub fn with_common_layers(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(assign_request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .request_id()
        .map(ToString::to_string)
        .unwrap_or_default();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        request_id = %request_id,
        client = %client,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// HTTP server for the webhook receiver.
pub struct HttpServer {
    router: Router,
    config: ReceiverConfig,
    limiter: Arc<FixedWindowLimiter>,
    auth: Arc<TokenAuth>,
}

impl HttpServer {
    /// Create a server using this platform's notifier.
    pub fn new(config: ReceiverConfig) -> Self {
        Self::with_notifier(config, platform_notifier())
    }

    /// Create a server with an explicit notifier (or none).
    pub fn with_notifier(config: ReceiverConfig, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let state = AppState::new(&config, notifier);
        let limiter = state.limiter.clone();
        let auth = state.auth.clone();
        let router = build_router(state);
        Self {
            router,
            config,
            limiter,
            auth,
        }
    }

    /// Handle to the rate limiter shared with the request pipeline.
    pub fn limiter(&self) -> Arc<FixedWindowLimiter> {
        self.limiter.clone()
    }

    /// Token check shared with the request pipeline.
    pub fn auth(&self) -> Arc<TokenAuth> {
        self.auth.clone()
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then let in-flight
    /// requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let auth_enabled = self.auth.is_enabled();
        tracing::info!(
            address = %addr,
            rate_limit = self.config.rate_limit.max_requests,
            auth_enabled,
            "HTTP server starting"
        );

        let reset = spawn_window_reset(self.limiter.clone(), WINDOW, shutdown.resubscribe());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reset.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_reads_auth_from_pipeline_state() {
        let mut config = ReceiverConfig::default();
        let open = HttpServer::with_notifier(config.clone(), None);
        assert!(!open.auth().is_enabled());

        config.auth.api_token = Some("secret".into());
        let server = HttpServer::with_notifier(config, None);
        let auth = server.auth();
        assert!(auth.is_enabled());
        assert!(auth.verify(Some("secret")));
        assert!(Arc::ptr_eq(&auth, &server.auth()));
    }
}
