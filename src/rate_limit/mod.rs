//! Fixed-window rate limiting for sensitive operations such as login.
//!
//! Call sites depend on the [`RateLimiter`] trait only, so the in-memory
//! store can be replaced by a shared one without touching handlers.

mod memory;

pub use memory::InMemoryRateLimiter;

use axum::http::HeaderMap;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bucket shared by every caller whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds at which the current window ends.
    pub reset_at: u64,
}

impl RateLimitDecision {
    /// Seconds a rejected caller should wait, rounded up and never zero.
    #[must_use]
    pub fn retry_after_seconds(&self, now_ms: u64) -> u64 {
        self.reset_at.saturating_sub(now_ms).div_ceil(1000).max(1)
    }
}

pub trait RateLimiter: Send + Sync {
    /// Record an attempt for `key` and decide whether it may proceed.
    fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision;

    /// Drop entries whose window has elapsed; returns how many were removed.
    fn sweep(&self) -> usize;
}

/// Run [`RateLimiter::sweep`] on a fixed interval until the task is aborted.
pub fn spawn_sweeper(limiter: Arc<dyn RateLimiter>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                debug!(removed, "Swept expired rate limit entries");
            }
        }
    })
}

/// Caller identity for rate limiting: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the shared [`UNKNOWN_CLIENT`] bucket.
#[must_use]
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_key(&headers), "1.2.3.4");
    }

    #[test]
    fn client_key_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 5.6.7.8"));
        headers.insert("x-real-ip", HeaderValue::from_static(" 9.9.9.9 "));
        assert_eq!(client_key(&headers), "9.9.9.9");
    }

    #[test]
    fn client_key_unknown_when_missing() {
        assert_eq!(client_key(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn retry_after_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: 10_500,
        };
        assert_eq!(decision.retry_after_seconds(9_000), 2);
        assert_eq!(decision.retry_after_seconds(10_000), 1);
        assert_eq!(decision.retry_after_seconds(20_000), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_removes_expired_entries() {
        let limiter = Arc::new(InMemoryRateLimiter::new());
        limiter.check_at("stale", 5, Duration::from_millis(1), 0);
        assert_eq!(limiter.len(), 1);

        let handle = spawn_sweeper(limiter.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        handle.abort();

        assert_eq!(limiter.len(), 0);
    }
}
