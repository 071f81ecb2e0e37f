//! Route handlers.

use axum::{extract::State, Extension, Json};

use crate::http::payload::AlertPayload;
use crate::http::request::RequestId;
use crate::http::response::Ack;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /health`
pub async fn health() -> Json<Ack> {
    metrics::record_request("health");
    Json(Ack::ok())
}

/// `POST /test`
///
/// Acknowledges every well-formed alert. A firing alert also starts the
/// local notification, whose outcome never affects the response.
pub async fn receive_alert(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: AlertPayload,
) -> Json<Ack> {
    metrics::record_request("webhook");
    tracing::info!(payload = %payload.0, "Received alert notification");
    metrics::record_alert(payload.status());

    if payload.is_firing() {
        let dispatched = state.alerts.dispatch(&request_id);
        tracing::debug!(dispatched, "Firing alert");
    }

    tracing::info!("Alert handled");
    Json(Ack::received())
}
