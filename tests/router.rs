//! Router tests driven in-process with `oneshot`.

use std::net::SocketAddr;
use std::sync::Arc;

use alert_webhook::http::{build_router, with_common_layers, AppState};
use alert_webhook::notify::Notifier;
use alert_webhook::ReceiverConfig;
use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{config, RecordingNotifier};

fn app(config: &ReceiverConfig, notifier: Option<Arc<dyn Notifier>>) -> Router {
    build_router(AppState::new(config, notifier))
}

fn as_client(router: &Router, ip: &str) -> Router {
    let addr: SocketAddr = format!("{ip}:40000").parse().unwrap();
    router.clone().layer(MockConnectInfo(addr))
}

fn alert(body: Value) -> Request<Body> {
    Request::post("/test")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn budgets_are_per_client_address() {
    let router = app(&config(2, None), None);
    let a = as_client(&router, "10.0.0.1");
    let b = as_client(&router, "10.0.0.2");

    for _ in 0..2 {
        let res = a.clone().oneshot(alert(json!({}))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = a.clone().oneshot(alert(json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let res = b.clone().oneshot(alert(json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn zero_budget_rejects_webhook_but_not_health() {
    let router = as_client(&app(&config(0, None), None), "10.0.0.3");

    let res = router.clone().oneshot(alert(json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let res = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn acknowledgement_shape() {
    let router = as_client(&app(&config(5, None), None), "10.0.0.4");

    let res = router.oneshot(alert(json!({"status": "resolved"}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(
        json_body(res).await,
        json!({"status": "ok", "message": "received"})
    );
}

#[tokio::test]
async fn firing_without_platform_notifier_still_acknowledges() {
    let router = as_client(&app(&config(5, None), None), "10.0.0.5");

    let res = router.oneshot(alert(json!({"status": "firing"}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn firing_notifies_through_router() {
    let notifier = Arc::new(RecordingNotifier::default());
    let router = as_client(&app(&config(5, None), Some(notifier.clone())), "10.0.0.6");

    let res = router.oneshot(alert(json!({"status": "firing"}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    notifier.wait_for_call().await;
    assert_eq!(notifier.calls(), 1);
}

#[tokio::test]
async fn scalar_json_is_bad_request() {
    let router = as_client(&app(&config(5, None), None), "10.0.0.7");

    let req = Request::post("/test")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("\"firing\""))
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Bad Request");
}

#[tokio::test]
async fn handler_panic_becomes_bad_request() {
    async fn explode() -> &'static str {
        panic!("handler blew up")
    }

    let router = with_common_layers(Router::new().route("/boom", post(explode)));

    let res = router
        .oneshot(Request::post("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().contains_key("x-request-id"));
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Bad Request");
}
