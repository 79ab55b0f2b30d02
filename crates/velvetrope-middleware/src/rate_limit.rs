//! Rate-limit counter store.
//!
//! Counters are keyed `routePrefix:clientIp` and live behind the
//! [`RateLimitStore`] trait so the security stage never hardcodes
//! process-global state: single-instance deployments inject
//! [`InMemoryRateLimitStore`], multi-instance deployments can inject a
//! shared cache. The in-memory store is process-local and therefore only
//! best-effort across multiple server instances, a documented
//! limitation, not a correctness target.
//!
//! `check` takes an explicit `now` so the window arithmetic is
//! deterministic under test.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use velvetrope_config::RateLimitRule;

/// Outcome of one counter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request fits in the current window.
    Allowed {
        /// Requests left in the window after this one.
        remaining: u64,
    },
    /// The window's budget is exhausted.
    Limited,
}

/// A store of per-key request counters.
pub trait RateLimitStore: Send + Sync + 'static {
    /// Records a request against `key` and decides whether it fits.
    ///
    /// Semantics: a counter whose window has elapsed at `now` is reset
    /// to `count = 1` with a fresh window; otherwise the request is
    /// rejected once the count has reached the rule's budget, and
    /// counted otherwise.
    fn check(&self, key: &str, rule: &RateLimitRule, now: Instant) -> RateLimitDecision;
}

/// One counter: requests seen and when the window ends.
#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    reset_at: Instant,
}

/// Process-local [`RateLimitStore`] over a mutexed map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    counters: Mutex<HashMap<String, Counter>>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live counters (for tests and introspection).
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    /// Returns true if no counters exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn check(&self, key: &str, rule: &RateLimitRule, now: Instant) -> RateLimitDecision {
        let window = Duration::from_millis(rule.window_ms);
        let mut counters = self.counters.lock();

        match counters.get_mut(key) {
            Some(counter) if now < counter.reset_at => {
                if counter.count >= rule.max_requests {
                    return RateLimitDecision::Limited;
                }
                counter.count += 1;
                RateLimitDecision::Allowed {
                    remaining: rule.max_requests - counter.count,
                }
            }
            _ => {
                // First request for the key, or the window elapsed:
                // reset to count = 1 with a fresh window.
                counters.insert(
                    key.to_string(),
                    Counter {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                RateLimitDecision::Allowed {
                    remaining: rule.max_requests - 1,
                }
            }
        }
    }
}
