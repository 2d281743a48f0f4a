//! Fixed-window request-rate accounting per client identity.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Outcome of a rate-limit check.
///
/// Rejection is a normal terminal outcome, not an error; the pipeline turns
/// it into a 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request may proceed.
    Allowed,
    /// Request must be rejected; the window resets after `retry_after`.
    Limited {
        /// Time until the current window elapses.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Whether the request may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-identity fixed-window rate limiter.
///
/// One bucket per identity. Counts are monotonic within a window and reset
/// exactly once when the window boundary is crossed.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per identity per `window`.
    #[must_use]
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self { window, max_requests, buckets: DashMap::new() }
    }

    /// Account for one request from `identity` and decide its fate.
    ///
    /// A fresh or elapsed bucket resets to `count = 1` and allows; otherwise
    /// the count increments and the request is allowed while it stays within
    /// the configured maximum.
    pub fn check(&self, identity: &str) -> RateDecision {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| Bucket { window_start: now, count: 0 });

        let elapsed = now.duration_since(bucket.window_start);
        if elapsed >= self.window {
            bucket.window_start = now;
            bucket.count = 1;
            return RateDecision::Allowed;
        }

        bucket.count += 1;
        if bucket.count <= self.max_requests {
            RateDecision::Allowed
        } else {
            RateDecision::Limited { retry_after: self.window - elapsed }
        }
    }

    /// Number of identities currently tracked.
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.buckets.len()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}
