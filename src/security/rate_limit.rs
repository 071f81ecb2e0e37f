//! Fixed-window rate limiting per client address.
//!
//! Every client shares the same window boundaries: a single background task
//! zeroes all counters once per window. Entries are zeroed, never removed, so
//! memory grows with the number of distinct addresses seen during the
//! process lifetime.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::http::response::ApiError;
use crate::observability::metrics;

/// Length of one rate limit window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At or under 80% of the budget.
    Admit { count: u32 },
    /// Admitted, but above 80% of the budget.
    NearLimit { count: u32 },
    /// Over budget.
    Reject { count: u32 },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Decision::Reject { .. })
    }
}

/// Request counters keyed by client address.
pub struct FixedWindowLimiter {
    counters: DashMap<String, u32>,
    max_requests: u32,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32) -> Self {
        Self {
            counters: DashMap::new(),
            max_requests,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count a request from `client` and decide whether to admit it.
    ///
    /// The counter is incremented before the decision, so rejected requests
    /// also count.
    pub fn check(&self, client: &str) -> Decision {
        let count = {
            let mut entry = self.counters.entry(client.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
            *entry
        };

        let max = u64::from(self.max_requests);
        let seen = u64::from(count);
        if seen > max {
            Decision::Reject { count }
        } else if seen * 5 > max * 4 {
            Decision::NearLimit { count }
        } else {
            Decision::Admit { count }
        }
    }

    /// Current count for `client`, if it has been seen.
    pub fn count(&self, client: &str) -> Option<u32> {
        self.counters.get(client).map(|c| *c)
    }

    /// Number of distinct clients tracked.
    pub fn tracked_clients(&self) -> usize {
        self.counters.len()
    }

    /// Zero every counter. Entries stay in the map.
    pub fn reset(&self) {
        for mut entry in self.counters.iter_mut() {
            *entry.value_mut() = 0;
        }
    }
}

/// Spawn the task that resets `limiter` every `period` until shutdown.
///
/// The first reset happens one full period after the call.
pub fn spawn_window_reset(
    limiter: Arc<FixedWindowLimiter>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    limiter.reset();
                    tracing::debug!(clients = limiter.tracked_clients(), "Rate limit window reset");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit reset task stopping");
                    break;
                }
            }
        }
    })
}

/// Middleware enforcing the per-client budget.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<FixedWindowLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = addr.ip().to_string();
    let max = limiter.max_requests();

    match limiter.check(&client) {
        Decision::Reject { count } => {
            tracing::warn!(client = %client, count, max, "Request blocked, rate limit exceeded");
            metrics::record_rate_limited();
            ApiError::TooManyRequests.into_response()
        }
        Decision::NearLimit { count } => {
            tracing::warn!(client = %client, count, max, "Approaching rate limit");
            next.run(request).await
        }
        Decision::Admit { .. } => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_exactly_max_then_rejects() {
        let limiter = FixedWindowLimiter::new(3);
        assert!(limiter.check("10.0.0.1").is_admitted());
        assert!(limiter.check("10.0.0.1").is_admitted());
        assert!(limiter.check("10.0.0.1").is_admitted());
        assert_eq!(limiter.check("10.0.0.1"), Decision::Reject { count: 4 });
    }

    #[test]
    fn rejected_requests_keep_counting() {
        let limiter = FixedWindowLimiter::new(1);
        limiter.check("a");
        limiter.check("a");
        limiter.check("a");
        assert_eq!(limiter.count("a"), Some(3));
    }

    #[test]
    fn near_limit_above_eighty_percent() {
        let limiter = FixedWindowLimiter::new(10);
        for expected in 1..=8 {
            assert_eq!(limiter.check("c"), Decision::Admit { count: expected });
        }
        assert_eq!(limiter.check("c"), Decision::NearLimit { count: 9 });
        assert_eq!(limiter.check("c"), Decision::NearLimit { count: 10 });
        assert_eq!(limiter.check("c"), Decision::Reject { count: 11 });
    }

    #[test]
    fn zero_budget_rejects_first_request() {
        let limiter = FixedWindowLimiter::new(0);
        assert_eq!(limiter.check("z"), Decision::Reject { count: 1 });
    }

    #[test]
    fn clients_are_independent() {
        let limiter = FixedWindowLimiter::new(1);
        assert!(limiter.check("a").is_admitted());
        assert!(!limiter.check("a").is_admitted());
        assert!(limiter.check("b").is_admitted());
    }

    #[test]
    fn reset_zeroes_without_removing() {
        let limiter = FixedWindowLimiter::new(1);
        limiter.check("a");
        limiter.check("a");
        limiter.check("b");

        limiter.reset();

        assert_eq!(limiter.tracked_clients(), 2);
        assert_eq!(limiter.count("a"), Some(0));
        assert!(limiter.check("a").is_admitted());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_task_runs_each_window() {
        let limiter = Arc::new(FixedWindowLimiter::new(1));
        let (tx, rx) = broadcast::channel(1);
        let handle = spawn_window_reset(limiter.clone(), WINDOW, rx);

        limiter.check("a");
        limiter.check("a");
        tokio::time::sleep(WINDOW / 2).await;
        assert_eq!(limiter.count("a"), Some(2));

        tokio::time::sleep(WINDOW).await;
        assert_eq!(limiter.count("a"), Some(0));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
