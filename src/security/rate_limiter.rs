//! Fixed-window rate limiting for visitor actions.
//!
//! Each action key counts uses inside a window that starts at the key's first
//! use. A key whose window has elapsed starts over on its next use, and a
//! periodic task additionally clears every key once per window length. This
//! is a fixed-window approximation: a burst straddling a window boundary can
//! pass up to twice the limit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Usage of one action key inside its current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Action key
    pub key: String,
    /// Uses counted in this window
    pub count: u32,
    /// When this window started
    pub window_start: Instant,
}

/// Counts actions per key and refuses those over the limit.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    /// Create a limiter on the system clock.
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock::new()))
    }

    /// Create a limiter reading time from `clock`.
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &RateLimitEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.window_start) >= self.window
    }

    /// Record one use of `action_key` if fewer than `max_per_window` uses
    /// were counted in the current window.
    ///
    /// Returns `false` without counting anything when the limit is reached.
    pub fn allow(&self, action_key: &str, max_per_window: u32) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries();

        if entries
            .get(action_key)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            trace!(action = action_key, "Rate limit window elapsed");
            entries.remove(action_key);
        }

        let count = entries.get(action_key).map_or(0, |entry| entry.count);
        if count >= max_per_window {
            debug!(
                action = action_key,
                count,
                limit = max_per_window,
                "Rate limit reached"
            );
            return false;
        }

        entries
            .entry(action_key.to_string())
            .and_modify(|entry| entry.count += 1)
            .or_insert_with(|| RateLimitEntry {
                key: action_key.to_string(),
                count: 1,
                window_start: now,
            });
        true
    }

    /// Uses left for `action_key` in the current window.
    pub fn remaining(&self, action_key: &str, max_per_window: u32) -> u32 {
        let now = self.clock.now();
        let used = self
            .entries()
            .get(action_key)
            .filter(|entry| !self.is_expired(entry, now))
            .map_or(0, |entry| entry.count);
        max_per_window.saturating_sub(used)
    }

    /// Snapshot of one key's entry
    pub fn entry(&self, action_key: &str) -> Option<RateLimitEntry> {
        self.entries().get(action_key).cloned()
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no key is tracked
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Forget every key.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let evicted = entries.len();
        entries.clear();
        debug!(evicted, "Rate limit store cleared");
    }

    /// Clear the store once per window until the limiter is dropped.
    pub fn spawn_periodic_clear(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);
        let period = self.window;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => limiter.clear(),
                    None => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockClock;

    fn limiter_with_clock() -> (RateLimiter, MockClock) {
        let clock = MockClock::new(Instant::now());
        let limiter = RateLimiter::with_clock(DEFAULT_WINDOW, Arc::new(clock.clone()));
        (limiter, clock)
    }

    #[test]
    fn test_limit_within_window() {
        let (limiter, _clock) = limiter_with_clock();

        assert!(limiter.allow("k", 3));
        assert!(limiter.allow("k", 3));
        assert!(limiter.allow("k", 3));
        assert!(!limiter.allow("k", 3));
    }

    #[test]
    fn test_refusal_does_not_mutate() {
        let (limiter, _clock) = limiter_with_clock();
        for _ in 0..3 {
            limiter.allow("k", 3);
        }
        let before = limiter.entry("k").unwrap();

        assert!(!limiter.allow("k", 3));
        assert!(!limiter.allow("k", 3));
        assert_eq!(limiter.entry("k").unwrap(), before);
        assert_eq!(before.count, 3);
    }

    #[test]
    fn test_window_elapse_resets_key() {
        let (limiter, clock) = limiter_with_clock();
        for _ in 0..3 {
            assert!(limiter.allow("k", 3));
        }
        assert!(!limiter.allow("k", 3));

        clock.advance(Duration::from_secs(59));
        assert!(!limiter.allow("k", 3));

        clock.advance(Duration::from_secs(1));
        assert!(limiter.allow("k", 3));
        assert_eq!(limiter.entry("k").unwrap().count, 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let (limiter, _clock) = limiter_with_clock();
        for _ in 0..3 {
            limiter.allow("k", 3);
        }
        limiter.allow("other", 1);
        assert_eq!(limiter.len(), 2);

        limiter.clear();
        assert!(limiter.is_empty());
        assert!(limiter.allow("k", 3));
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _clock) = limiter_with_clock();
        assert!(limiter.allow("a", 1));
        assert!(!limiter.allow("a", 1));
        assert!(limiter.allow("b", 1));
    }

    #[test]
    fn test_zero_limit_never_allows() {
        let (limiter, _clock) = limiter_with_clock();
        assert!(!limiter.allow("k", 0));
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_remaining() {
        let (limiter, clock) = limiter_with_clock();
        assert_eq!(limiter.remaining("k", 3), 3);
        limiter.allow("k", 3);
        limiter.allow("k", 3);
        assert_eq!(limiter.remaining("k", 3), 1);

        clock.advance(DEFAULT_WINDOW);
        assert_eq!(limiter.remaining("k", 3), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_clear() {
        let limiter = Arc::new(RateLimiter::new(DEFAULT_WINDOW));
        let handle = limiter.spawn_periodic_clear();

        for _ in 0..3 {
            assert!(limiter.allow("k", 3));
        }
        assert!(!limiter.allow("k", 3));

        tokio::time::sleep(DEFAULT_WINDOW + Duration::from_millis(10)).await;
        assert!(limiter.is_empty());
        assert!(limiter.allow("k", 3));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_clear_stops_when_dropped() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
        let handle = limiter.spawn_periodic_clear();
        drop(limiter);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(handle.is_finished());
    }
}
