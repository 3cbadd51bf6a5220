//! Sliding-window rate limiter for expensive endpoints
//!
//! Each scope (an endpoint name, optionally suffixed with a client key) keeps
//! the timestamps of its accepted calls. A call is admitted while fewer than
//! `quota` of them lie inside the trailing window. Rejected calls leave the
//! window untouched, so hammering a full scope does not extend the lockout.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::config::RateLimitConfig;

/// Scope for the full-summary endpoint
pub const FULL_SUMMARY_SCOPE: &str = "full_summary";

/// Scope for the explanation endpoint
pub const EXPLAIN_SCOPE: &str = "explain";

pub struct RateLimiter {
    /// Accepted-call timestamps per scope, oldest first
    windows: DashMap<String, VecDeque<DateTime<Utc>>>,
    quota: usize,
    window: chrono::Duration,
    clock: SharedClock,
    /// Name for logging purposes
    name: String,
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, clock: SharedClock, name: &str) -> Self {
        Self {
            windows: DashMap::new(),
            quota: config.quota,
            window: chrono::Duration::from_std(config.window)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            clock,
            name: name.to_string(),
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    /// Admit or reject one call for `scope`.
    ///
    /// The prune, count and push happen under the scope's map entry lock, so
    /// concurrent callers sharing a scope cannot both take the last slot.
    pub fn allow(&self, scope: &str) -> bool {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let now = self.clock.now();

        let mut timestamps = self.windows.entry(scope.to_string()).or_default();
        prune(&mut timestamps, now, self.window);

        if timestamps.len() < self.quota {
            timestamps.push_back(now);
            debug!(
                "[RATE_LIMITER:{}] scope={} accepted ({}/{})",
                self.name,
                scope,
                timestamps.len(),
                self.quota
            );
            true
        } else {
            self.rejected_requests.fetch_add(1, Ordering::Relaxed);
            warn!(
                "[RATE_LIMITER:{}] scope={} rejected, {} calls in the last {}s",
                self.name,
                scope,
                timestamps.len(),
                self.window.num_seconds()
            );
            false
        }
    }

    /// Calls still available to `scope` in the current window
    pub fn remaining(&self, scope: &str) -> usize {
        let now = self.clock.now();
        match self.windows.get(scope) {
            Some(timestamps) => {
                let live = timestamps
                    .iter()
                    .filter(|t| now.signed_duration_since(**t) < self.window)
                    .count();
                self.quota.saturating_sub(live)
            }
            None => self.quota,
        }
    }

    /// Time until `scope` admits another call, `None` when it would be admitted now
    pub fn retry_after(&self, scope: &str) -> Option<Duration> {
        if self.remaining(scope) > 0 {
            return None;
        }
        let now = self.clock.now();
        let timestamps = self.windows.get(scope)?;
        let live: Vec<&DateTime<Utc>> = timestamps
            .iter()
            .filter(|t| now.signed_duration_since(**t) < self.window)
            .collect();
        // The window reopens when enough old calls fall out to free one slot
        let freeing = live.len().checked_sub(self.quota)?;
        let oldest = live.get(freeing)?;
        (**oldest + self.window - now).to_std().ok()
    }

    /// Drop expired timestamps everywhere and forget idle scopes
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });
        before - self.windows.len()
    }

    /// Get statistics about this rate limiter (for debugging)
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            quota: self.quota,
            window_secs: self.window.num_seconds().max(0) as u64,
            active_scopes: self.windows.len(),
            name: self.name.clone(),
        }
    }
}

fn prune(timestamps: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>, window: chrono::Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.signed_duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

/// Statistics about rate limiter usage
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub quota: usize,
    pub window_secs: u64,
    pub active_scopes: usize,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::MockClock;
    use chrono::TimeZone;

    fn limiter(clock: &MockClock) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig::default(), Arc::new(clock.clone()), "test")
    }

    fn clock() -> MockClock {
        MockClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_eleventh_call_rejected() {
        let clock = clock();
        let limiter = limiter(&clock);

        for i in 0..10 {
            assert!(limiter.allow("full_summary"), "call {} should pass", i + 1);
            clock.advance_secs(1);
        }
        assert!(!limiter.allow("full_summary"));
        assert_eq!(limiter.remaining("full_summary"), 0);
        assert_eq!(limiter.stats().rejected_requests, 1);
    }

    #[test]
    fn test_window_elapses() {
        let clock = clock();
        let limiter = limiter(&clock);

        for _ in 0..10 {
            assert!(limiter.allow("explain"));
        }
        assert!(!limiter.allow("explain"));

        clock.advance_secs(59);
        assert!(!limiter.allow("explain"));

        clock.advance_secs(1);
        assert!(limiter.allow("explain"));
        assert_eq!(limiter.remaining("explain"), 9);
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let clock = clock();
        let limiter = limiter(&clock);

        for _ in 0..10 {
            assert!(limiter.allow("s"));
        }
        for _ in 0..30 {
            clock.advance_secs(1);
            assert!(!limiter.allow("s"));
        }
        clock.advance_secs(30);
        assert!(limiter.allow("s"));
    }

    #[test]
    fn test_scopes_are_independent() {
        let clock = clock();
        let limiter = limiter(&clock);

        for _ in 0..10 {
            assert!(limiter.allow(FULL_SUMMARY_SCOPE));
        }
        assert!(!limiter.allow(FULL_SUMMARY_SCOPE));
        assert!(limiter.allow(EXPLAIN_SCOPE));
    }

    #[test]
    fn test_retry_after() {
        let clock = clock();
        let limiter = limiter(&clock);

        assert_eq!(limiter.retry_after("s"), None);
        for _ in 0..10 {
            assert!(limiter.allow("s"));
            clock.advance_secs(2);
        }
        // Oldest call was 20s ago, so the window frees a slot in 40s
        assert_eq!(limiter.retry_after("s"), Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_sweep_forgets_idle_scopes() {
        let clock = clock();
        let limiter = limiter(&clock);

        assert!(limiter.allow("a"));
        assert!(limiter.allow("b"));
        clock.advance_secs(61);
        assert!(limiter.allow("b"));

        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.stats().active_scopes, 1);
    }

    #[test]
    fn test_concurrent_callers_share_quota() {
        let clock = clock();
        let limiter = Arc::new(limiter(&clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..5).filter(|_| limiter.allow("shared")).count())
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 10);
    }
}
