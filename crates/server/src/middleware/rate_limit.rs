use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use common::metrics::RATE_LIMITED_TOTAL;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Token bucket with fractional refill, so slow rates still accrue between calls.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u64, refill_per_sec: u64) -> Self {
        Self { capacity: capacity as f64, tokens: capacity as f64, per_sec: refill_per_sec as f64, last_refill: Instant::now() }
    }

    /// Take one token, or report how long until one is available.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill(Instant::now());
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            debug!(remaining = self.tokens, "token acquired");
            Ok(())
        } else if self.per_sec > 0.0 {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / self.per_sec))
        } else {
            Err(Duration::from_secs(1))
        }
    }

    fn refill(&mut self, now: Instant) {
        if now <= self.last_refill {
            return;
        }
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.per_sec).min(self.capacity);
        self.last_refill = now;
    }
}

/// Process-wide limiter shared by every mutating route.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_second: u64, burst: u64, enabled: bool) -> Self {
        Self { bucket: Arc::new(Mutex::new(TokenBucket::new(burst, requests_per_second))), enabled }
    }

    pub fn from_config(cfg: &configs::RateLimitConfig) -> Self {
        Self::new(cfg.requests_per_second, cfg.burst, cfg.enabled)
    }

    pub async fn check(&self) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }
        self.bucket.lock().await.try_acquire()
    }
}

/// Reads pass through; writes spend a token or get 429 with `Retry-After`.
pub async fn limit_writes(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    let is_read = matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if is_read {
        return next.run(req).await;
    }
    match state.limiter.check().await {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            RATE_LIMITED_TOTAL.inc();
            warn!(method = %req.method(), path = %req.uri().path(), wait_ms = wait.as_millis() as u64, "rate limit exceeded");
            let mut resp = JsonApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests, slow down.").into_response();
            let secs = wait.as_secs_f64().ceil().max(1.0) as u64;
            resp.headers_mut().insert(RETRY_AFTER, HeaderValue::from(secs));
            resp
        }
    }
}
