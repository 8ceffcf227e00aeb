use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use super::{RateLimitDecision, RateLimiter};
use crate::clock;

#[derive(Clone, Copy, Debug)]
struct RateLimitEntry {
    count: u32,
    /// Epoch milliseconds.
    reset_at: u64,
}

impl RateLimitEntry {
    const fn elapsed(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_at
    }
}

/// Process-local limiter; counts reset on restart.
#[derive(Debug, Default)]
pub struct InMemoryRateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// [`RateLimiter::check`] against an explicit clock.
    pub fn check_at(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
        now_ms: u64,
    ) -> RateLimitDecision {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let mut entries = self.lock();

        if let Some(entry) = entries
            .get_mut(key)
            .filter(|entry| !entry.elapsed(now_ms))
        {
            if entry.count >= max_requests {
                return RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at: entry.reset_at,
                };
            }
            entry.count += 1;
            return RateLimitDecision {
                allowed: true,
                remaining: max_requests - entry.count,
                reset_at: entry.reset_at,
            };
        }

        let reset_at = now_ms.saturating_add(window_ms);
        if max_requests == 0 {
            entries.remove(key);
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at,
            };
        }
        entries.insert(key.to_string(), RateLimitEntry { count: 1, reset_at });
        RateLimitDecision {
            allowed: true,
            remaining: max_requests - 1,
            reset_at,
        }
    }

    /// [`RateLimiter::sweep`] against an explicit clock.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.elapsed(now_ms));
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are independent, so a panic mid-update cannot leave the map
    // inconsistent; keep serving from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision {
        self.check_at(key, max_requests, window, clock::unix_millis())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(clock::unix_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(60);
    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn counts_down_then_rejects() {
        let limiter = InMemoryRateLimiter::new();
        let remaining: Vec<u32> = (0..5)
            .map(|_| limiter.check_at("k", 5, WINDOW, NOW))
            .inspect(|decision| assert!(decision.allowed))
            .map(|decision| decision.remaining)
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let sixth = limiter.check_at("k", 5, WINDOW, NOW + 10);
        assert!(!sixth.allowed);
        assert_eq!(sixth.remaining, 0);
        assert_eq!(sixth.reset_at, NOW + 60_000);
    }

    #[test]
    fn rejection_does_not_increment() {
        let limiter = InMemoryRateLimiter::new();
        for _ in 0..10 {
            limiter.check_at("k", 2, WINDOW, NOW);
        }
        let entries = limiter.lock();
        assert_eq!(entries.get("k").map(|entry| entry.count), Some(2));
    }

    #[test]
    fn window_elapse_resets() {
        let limiter = InMemoryRateLimiter::new();
        for _ in 0..6 {
            limiter.check_at("k", 5, WINDOW, NOW);
        }
        let decision = limiter.check_at("k", 5, WINDOW, NOW + 60_000);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
        assert_eq!(decision.reset_at, NOW + 120_000);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        assert!(limiter.check_at("a", 1, WINDOW, NOW).allowed);
        assert!(!limiter.check_at("a", 1, WINDOW, NOW).allowed);
        assert!(limiter.check_at("b", 1, WINDOW, NOW).allowed);
    }

    #[test]
    fn zero_budget_always_rejects() {
        let limiter = InMemoryRateLimiter::new();
        let decision = limiter.check_at("k", 0, WINDOW, NOW);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert!(limiter.is_empty());
    }

    #[test]
    fn sweep_removes_only_elapsed_windows() {
        let limiter = InMemoryRateLimiter::new();
        limiter.check_at("old", 5, Duration::from_secs(1), NOW);
        limiter.check_at("new", 5, WINDOW, NOW);

        assert_eq!(limiter.sweep_at(NOW + 500), 0);
        assert_eq!(limiter.sweep_at(NOW + 1_000), 1);
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.sweep_at(NOW + 60_000), 1);
        assert!(limiter.is_empty());
    }

    #[test]
    fn concurrent_checks_never_exceed_budget() {
        let limiter = Arc::new(InMemoryRateLimiter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| limiter.check_at("shared", 100, WINDOW, NOW).allowed)
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(0))
            .sum();
        assert_eq!(allowed, 100);
    }

    #[test]
    fn trait_object_uses_wall_clock() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new());
        let decision = limiter.check("login:1.2.3.4", 3, WINDOW);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
        assert!(decision.reset_at > clock::unix_millis());
        assert_eq!(limiter.sweep(), 0);
    }
}
