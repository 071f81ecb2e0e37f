//! Alert payload extraction.
//!
//! The body is only parsed when the request says it is JSON. Other content
//! types are acknowledged as an empty payload, and an empty JSON body is an
//! empty object. Top-level JSON scalars are rejected.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde_json::{Map, Value};

use crate::http::response::ApiError;

/// Status value that triggers a local notification.
pub const FIRING: &str = "firing";

/// Arbitrary alert body. Only `status` is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPayload(pub Value);

impl AlertPayload {
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Parse a JSON body.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        match value {
            Value::Object(_) | Value::Array(_) => Ok(Self(value)),
            _ => Err(ApiError::BadRequest(
                "JSON body must be an object or array".to_string(),
            )),
        }
    }

    /// The `status` field, when it is a string.
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// Exact, case-sensitive match against `"firing"`.
    pub fn is_firing(&self) -> bool {
        self.status() == Some(FIRING)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

impl<S> FromRequest<S> for AlertPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Ok(Self::empty());
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Self::parse(&body)
    }
}
