//! Per-client sliding-window rate limiting.
//!
//! # Responsibilities
//! - Track request timestamps per client identity
//! - Decide admit/reject before any body byte is read
//! - Compute a retry-after hint anchored on the oldest surviving timestamp
//!
//! # Design Decisions
//! - Sliding window, not fixed buckets: stale entries are pruned before
//!   every decision, so the limit always covers the trailing window
//! - DashMap entry access serializes same-client callers (no check-then-act
//!   race) while distinct clients proceed independently
//! - The limiter never fails; it only returns a decision

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed.
    Admitted,
    /// The client is over its limit; retry after the hinted delay.
    Rejected { retry_after_secs: u64 },
}

/// Sliding-window limiter shared across all concurrent requests.
pub struct SlidingWindowLimiter {
    history: DashMap<String, VecDeque<Instant>>,
    limit: usize,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            history: DashMap::new(),
            limit: config.requests_per_window as usize,
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Decide whether a request from `client` is admitted right now.
    pub fn admit(&self, client: &str) -> Decision {
        self.admit_at(client, Instant::now())
    }

    fn admit_at(&self, client: &str, now: Instant) -> Decision {
        // Entry access is the critical section: same-client callers serialize
        // through the shard lock, so prune + check + append is atomic.
        let mut history = self.history.entry(client.to_string()).or_default();

        // Prune-before-check: entries strictly older than the window start
        // never count toward the limit.
        while history
            .front()
            .is_some_and(|t| now.duration_since(*t) > self.window)
        {
            history.pop_front();
        }

        if history.len() >= self.limit {
            // The oldest surviving timestamp anchors the retry estimate;
            // anything older was already pruned.
            let retry_after_secs = history
                .front()
                .map(|oldest| {
                    self.window
                        .saturating_sub(now.duration_since(*oldest))
                        .as_secs()
                        .max(1)
                })
                .unwrap_or(1);
            return Decision::Rejected { retry_after_secs };
        }

        history.push_back(now);
        Decision::Admitted
    }

    /// Drop clients whose pruned history is empty.
    ///
    /// Timestamp pruning alone never removes the per-client record, so a
    /// long-running process would accumulate one entry per client ever seen.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.history.retain(|_, history| {
            while history
                .front()
                .is_some_and(|t| now.duration_since(*t) > self.window)
            {
                history.pop_front();
            }
            !history.is_empty()
        });
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.history.len()
    }
}

/// Spawn the background task that periodically evicts idle clients.
///
/// The task runs until the shutdown signal resolves, so it never outlives
/// the server that spawned it.
pub fn spawn_sweeper(
    limiter: Arc<SlidingWindowLimiter>,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick completes immediately
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    limiter.sweep();
                    tracing::debug!(
                        tracked_clients = limiter.tracked_clients(),
                        "Rate limiter sweep complete"
                    );
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

/// Middleware enforcing admission before the handler runs.
///
/// Rejection short-circuits the request with 429 before any body byte is
/// pulled from the socket.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = addr.ip().to_string();
    match state.limiter.admit(&client) {
        Decision::Admitted => next.run(request).await,
        Decision::Rejected { retry_after_secs } => {
            tracing::warn!(client = %client, retry_after_secs, "Rate limit exceeded");
            metrics::record_rejected("rate_limited");
            ApiError::RateLimited { retry_after_secs }.into_response()
        }
    }
}
