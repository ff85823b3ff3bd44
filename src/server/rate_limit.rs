//! Per-client sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::{Environment, RateLimitConfig};

use super::error::ApiError;
use super::middleware::client_key;

/// Number of tracked clients above which idle windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

type Hits = HashMap<String, VecDeque<Instant>>;

/// Sliding-window request counter keyed by client.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    hits: Mutex<Hits>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests: max_requests as usize,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `key`.
    ///
    /// Returns the time until a slot frees up when the budget is spent.
    /// Rejected requests do not count against the budget.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        self.admit(&mut hits, key, now)?;
        record(&mut hits, key, now);
        Ok(())
    }

    /// Whether `key` has budget left at `now`, without recording a hit.
    fn admit(&self, hits: &mut Hits, key: &str, now: Instant) -> Result<(), Duration> {
        if hits.len() >= SWEEP_THRESHOLD {
            hits.retain(|_, queue| {
                expire(queue, now, self.window);
                !queue.is_empty()
            });
        }

        let queue = hits.entry(key.to_string()).or_default();
        expire(queue, now, self.window);

        if queue.len() >= self.max_requests {
            let oldest = queue.front().copied().unwrap_or(now);
            return Err(self.window.saturating_sub(now.duration_since(oldest)));
        }
        Ok(())
    }

    /// Number of clients with a live window.
    pub async fn tracked_clients(&self) -> usize {
        self.hits.lock().await.len()
    }
}

fn record(hits: &mut Hits, key: &str, now: Instant) {
    hits.entry(key.to_string()).or_default().push_back(now);
}

/// Drop hits that fell out of the window.
fn expire(queue: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while queue
        .front()
        .is_some_and(|&hit| now.duration_since(hit) >= window)
    {
        queue.pop_front();
    }
}

/// The limiters applied to `/api` routes.
#[derive(Debug)]
pub struct RateLimits {
    /// Every `/api` request. Absent when disabled or in the test environment.
    general: Option<RateLimiter>,
    /// Mutating requests only. Absent when rate limiting is disabled.
    write: Option<RateLimiter>,
    trust_proxy: bool,
}

impl RateLimits {
    pub fn new(config: &RateLimitConfig, environment: Environment, trust_proxy: bool) -> Self {
        let general = (config.enabled && environment != Environment::Test)
            .then(|| RateLimiter::new(config.window, config.max_requests));
        let write = config
            .enabled
            .then(|| RateLimiter::new(config.window, config.max_write_requests));

        Self {
            general,
            write,
            trust_proxy,
        }
    }

    /// Check `key` against the limiters that apply to `method`.
    ///
    /// A hit is recorded only when every applicable limiter admits the
    /// request.
    pub async fn check(&self, key: &str, method: &Method) -> Result<(), Duration> {
        let limiters: Vec<&RateLimiter> = self
            .general
            .iter()
            .chain(self.write.iter().filter(|_| is_write(method)))
            .collect();

        let now = Instant::now();
        // Always locked general-then-write.
        let mut guards = Vec::with_capacity(limiters.len());
        for limiter in &limiters {
            guards.push(limiter.hits.lock().await);
        }

        for (limiter, hits) in limiters.iter().zip(guards.iter_mut()) {
            limiter.admit(hits, key, now)?;
        }
        for hits in guards.iter_mut() {
            record(hits, key, now);
        }
        Ok(())
    }
}

fn is_write(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// Middleware rejecting clients over their budget with 429.
pub async fn rate_limit(
    State(limits): State<Arc<RateLimits>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request, limits.trust_proxy);

    match limits.check(&key, request.method()).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            tracing::warn!(
                client = %key,
                method = %request.method(),
                path = %request.uri().path(),
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}
