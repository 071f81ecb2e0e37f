//! Response bodies and the error responder.
//!
//! Rejections from the admission pipeline are JSON. Everything else that goes
//! wrong while handling a request, including panics, collapses into a plain
//! text `400 Bad Request` that hides the cause from the caller.

use std::any::Any;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors turned into client responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too Many Requests")]
    TooManyRequests,

    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed input or a failure while handling. The message is logged only.
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// JSON body for structured rejections.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Acknowledgement returned by the webhook route.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    /// `{"status":"ok","message":"received"}`
    pub fn received() -> Self {
        Self {
            status: "ok".to_string(),
            message: Some("received".to_string()),
        }
    }

    /// `{"status":"ok"}`
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(message) => {
                tracing::error!(error = %message, "Request failed");
                return bad_request();
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Bad Request",
    )
        .into_response()
}

/// Panic handler for `CatchPanicLayer`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::BadRequest(message).into_response()
}
