//! Per-agent request admission.
//!
//! One counter per [`AgentType`] with minute and hour counts. Windows are
//! reset lazily, at check time, relative to the counter's `last_reset`:
//!
//! - 60 s or more since the last reset clears the minute count.
//! - 3600 s or more clears the hour count as well.
//! - Either reset stamps `last_reset = now`.
//!
//! Because a minute reset also moves `last_reset`, steady traffic that keeps
//! triggering minute resets never lets a full hour elapse, so the hour count
//! only clears after an idle hour or an explicit [`RateLimiter::reset_all`].
//!
//! Agents with rate limiting disabled are still counted by
//! [`RateLimiter::try_acquire`], but nothing rolls their windows. Their
//! minute and hour counts are lifetime totals until `reset_all`.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::agents::{AgentType, RateLimitConfig};

pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 3_600_000;

/// Millisecond time source.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for deterministic window tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Request counts for one agent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCounter {
    pub minute_count: u32,
    pub hour_count: u32,
    pub last_reset_ms: i64,
}

impl RateLimitCounter {
    fn new(now_ms: i64) -> Self {
        Self {
            minute_count: 0,
            hour_count: 0,
            last_reset_ms: now_ms,
        }
    }

    /// Apply any due window resets.
    fn roll(&mut self, now_ms: i64) {
        let elapsed = now_ms - self.last_reset_ms;
        if elapsed >= MINUTE_MS {
            self.minute_count = 0;
            if elapsed >= HOUR_MS {
                self.hour_count = 0;
            }
            self.last_reset_ms = now_ms;
        }
    }

    fn admits(&self, limits: &RateLimitConfig) -> bool {
        self.minute_count < limits.requests_per_minute
            && self.hour_count < limits.requests_per_hour
    }

    fn record(&mut self) {
        self.minute_count = self.minute_count.saturating_add(1);
        self.hour_count = self.hour_count.saturating_add(1);
    }
}

/// Snapshot returned to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub minute: u32,
    pub hour: u32,
}

/// Admission control shared by every caller of a manager.
pub struct RateLimiter {
    counters: Mutex<HashMap<AgentType, RateLimitCounter>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a limiter with a counter for every agent type.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        let counters = AgentType::ALL
            .into_iter()
            .map(|t| (t, RateLimitCounter::new(now)))
            .collect();
        Self {
            counters: Mutex::new(counters),
            clock,
        }
    }

    /// Whether a request for `agent_type` may proceed. Applies due resets;
    /// does not count the request. `None` limits always admit.
    pub fn check(&self, agent_type: AgentType, limits: Option<&RateLimitConfig>) -> bool {
        let Some(limits) = limits else {
            return true;
        };
        let now = self.clock.now_ms();
        let mut counters = self.counters.lock();
        let counter = counters
            .entry(agent_type)
            .or_insert_with(|| RateLimitCounter::new(now));
        counter.roll(now);
        counter.admits(limits)
    }

    /// Count an admitted request.
    pub fn increment(&self, agent_type: AgentType) {
        let now = self.clock.now_ms();
        self.counters
            .lock()
            .entry(agent_type)
            .or_insert_with(|| RateLimitCounter::new(now))
            .record();
    }

    /// Check and count under a single lock acquisition.
    ///
    /// Returns `false` without counting when the request is rejected.
    pub fn try_acquire(&self, agent_type: AgentType, limits: Option<&RateLimitConfig>) -> bool {
        let now = self.clock.now_ms();
        let mut counters = self.counters.lock();
        let counter = counters
            .entry(agent_type)
            .or_insert_with(|| RateLimitCounter::new(now));

        if let Some(limits) = limits {
            counter.roll(now);
            if !counter.admits(limits) {
                debug!(
                    %agent_type,
                    minute = counter.minute_count,
                    hour = counter.hour_count,
                    "Rate limit reached"
                );
                return false;
            }
        }
        counter.record();
        true
    }

    /// Zero every counter and restart its windows now.
    pub fn reset_all(&self) {
        let now = self.clock.now_ms();
        let mut counters = self.counters.lock();
        for counter in counters.values_mut() {
            *counter = RateLimitCounter::new(now);
        }
        info!("Rate limits reset");
    }

    /// Current counts for every agent type.
    pub fn counts(&self) -> HashMap<AgentType, RequestCounts> {
        self.counters
            .lock()
            .iter()
            .map(|(t, c)| {
                (
                    *t,
                    RequestCounts {
                        minute: c.minute_count,
                        hour: c.hour_count,
                    },
                )
            })
            .collect()
    }

    pub fn counter(&self, agent_type: AgentType) -> Option<RateLimitCounter> {
        self.counters.lock().get(&agent_type).copied()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("counters", &*self.counters.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn limiter() -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let limiter = RateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    #[test]
    fn test_every_type_has_a_counter() {
        let (_, limiter) = limiter();
        let counts = limiter.counts();
        assert_eq!(counts.len(), AgentType::ALL.len());
        assert!(counts.values().all(|c| *c == RequestCounts::default()));
    }

    #[test]
    fn test_minute_limit() {
        let (clock, limiter) = limiter();
        let limits = RateLimitConfig::new(3, 100);

        for _ in 0..3 {
            assert!(limiter.check(AgentType::Tutor, Some(&limits)));
            limiter.increment(AgentType::Tutor);
        }
        assert!(!limiter.check(AgentType::Tutor, Some(&limits)));
        // Other agents are independent
        assert!(limiter.check(AgentType::Mentor, Some(&limits)));

        clock.advance(59_999);
        assert!(!limiter.check(AgentType::Tutor, Some(&limits)));
        clock.advance(1);
        assert!(limiter.check(AgentType::Tutor, Some(&limits)));
        assert_eq!(
            limiter.counts()[&AgentType::Tutor],
            RequestCounts { minute: 0, hour: 3 }
        );
    }

    #[test]
    fn test_hour_limit_survives_minute_reset() {
        let (clock, limiter) = limiter();
        let limits = RateLimitConfig::new(10, 2);

        assert!(limiter.try_acquire(AgentType::Assessment, Some(&limits)));
        assert!(limiter.try_acquire(AgentType::Assessment, Some(&limits)));
        assert!(!limiter.try_acquire(AgentType::Assessment, Some(&limits)));

        clock.advance(MINUTE_MS);
        assert!(!limiter.check(AgentType::Assessment, Some(&limits)));

        clock.advance(HOUR_MS);
        assert!(limiter.check(AgentType::Assessment, Some(&limits)));
    }

    #[test]
    fn test_minute_reset_restarts_hour_window() {
        let (clock, limiter) = limiter();
        let limits = RateLimitConfig::new(10, 100);

        limiter.increment(AgentType::Analytics);
        clock.advance(30 * MINUTE_MS);
        assert!(limiter.check(AgentType::Analytics, Some(&limits)));
        clock.advance(45 * MINUTE_MS);
        limiter.check(AgentType::Analytics, Some(&limits));

        // 75 minutes since the first request, but only 45 since last reset.
        assert_eq!(
            limiter.counter(AgentType::Analytics).map(|c| c.hour_count),
            Some(1)
        );
    }

    #[test]
    fn test_rejected_acquire_does_not_count() {
        let (_, limiter) = limiter();
        let limits = RateLimitConfig::new(1, 10);

        assert!(limiter.try_acquire(AgentType::DoubtSolver, Some(&limits)));
        assert!(!limiter.try_acquire(AgentType::DoubtSolver, Some(&limits)));
        assert_eq!(
            limiter.counts()[&AgentType::DoubtSolver],
            RequestCounts { minute: 1, hour: 1 }
        );
    }

    #[test]
    fn test_unlimited_always_admits_but_counts() {
        let (clock, limiter) = limiter();
        for _ in 0..100 {
            assert!(limiter.try_acquire(AgentType::Tutor, None));
        }
        assert!(limiter.check(AgentType::Tutor, None));
        assert_eq!(limiter.counts()[&AgentType::Tutor].minute, 100);

        // Windows never roll without limits
        clock.advance(2 * HOUR_MS);
        assert!(limiter.try_acquire(AgentType::Tutor, None));
        assert_eq!(
            limiter.counts()[&AgentType::Tutor],
            RequestCounts {
                minute: 101,
                hour: 101
            }
        );
    }

    #[test]
    fn test_reset_all() {
        let (clock, limiter) = limiter();
        let limits = RateLimitConfig::new(1, 1);
        for agent_type in AgentType::ALL {
            assert!(limiter.try_acquire(agent_type, Some(&limits)));
            assert!(!limiter.check(agent_type, Some(&limits)));
        }

        clock.advance(5);
        limiter.reset_all();

        for agent_type in AgentType::ALL {
            assert!(limiter.check(agent_type, Some(&limits)));
            assert_eq!(
                limiter.counter(agent_type).map(|c| c.last_reset_ms),
                Some(1_000_005)
            );
        }
    }

    #[test]
    fn test_concurrent_acquire_never_overshoots() {
        let limiter = Arc::new(RateLimiter::new());
        let limits = RateLimitConfig::new(50, 1000);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| limiter.try_acquire(AgentType::Mentor, Some(&limits)))
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(admitted, 50);
    }
}
