//! Shared-secret token check for the webhook route.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::ApiError;
use crate::observability::metrics;

/// Header carrying the caller's token.
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Token authenticator resolved once at startup.
///
/// With no secret configured every request passes, which keeps local setups
/// working without any header.
#[derive(Debug, Clone, Default)]
pub struct TokenAuth {
    secret: Option<String>,
}

impl TokenAuth {
    /// An empty secret is treated as no secret.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether `presented` satisfies the configured secret.
    pub fn verify(&self, presented: Option<&str>) -> bool {
        match &self.secret {
            None => true,
            Some(expected) => presented == Some(expected.as_str()),
        }
    }
}

/// Middleware rejecting requests whose `x-api-token` does not match.
pub async fn require_api_token(
    State(auth): State<Arc<TokenAuth>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    if auth.verify(presented) {
        return next.run(request).await;
    }

    tracing::warn!(token_present = presented.is_some(), "Rejected request with invalid API token");
    metrics::record_unauthorized();
    ApiError::Unauthorized.into_response()
}
