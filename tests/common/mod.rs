//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alert_webhook::notify::{AlertSound, Notifier, NotifyError};
use alert_webhook::security::FixedWindowLimiter;
use alert_webhook::{HttpServer, ReceiverConfig, Shutdown};
use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Notifier that records calls instead of playing anything.
#[derive(Default)]
pub struct RecordingNotifier {
    calls: AtomicUsize,
    played: Notify,
    sounds: std::sync::Mutex<Vec<AlertSound>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sounds(&self) -> Vec<AlertSound> {
        self.sounds.lock().unwrap().clone()
    }

    /// Wait until at least one call happened.
    pub async fn wait_for_call(&self) {
        tokio::time::timeout(Duration::from_secs(2), self.played.notified())
            .await
            .expect("notifier was not called");
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn play(&self, sound: &AlertSound) -> Result<(), NotifyError> {
        self.sounds.lock().unwrap().push(sound.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.played.notify_one();
        Ok(())
    }
}

/// A receiver running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub limiter: Arc<FixedWindowLimiter>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Boot a receiver with `config` and an optional notifier.
#[allow(dead_code)]
pub async fn start_server(
    config: ReceiverConfig,
    notifier: Option<Arc<dyn Notifier>>,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_notifier(config, notifier);
    let limiter = server.limiter();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        limiter,
        shutdown,
        handle,
    }
}

/// Config with the given budget and token.
#[allow(dead_code)]
pub fn config(max_requests: u32, token: Option<&str>) -> ReceiverConfig {
    let mut config = ReceiverConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.auth.api_token = token.map(str::to_string);
    config
}

/// HTTP client that never reuses pooled connections.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
