//! Clock, rate limiter and debouncer
//!
//! Time is a `Duration` since an arbitrary origin so tests can drive it by
//! hand. Nothing here spawns timers: the host calls `poll` from its tick.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

// ============================================================================
// RATE LIMITER
// ============================================================================

/// Lets one value through per interval and keeps the latest of the rest
#[derive(Debug, Clone)]
pub struct RateLimiter<T> {
    min_interval: Duration,
    last_update: Option<Duration>,
    pending: Option<T>,
}

impl<T> RateLimiter<T> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_update: None,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    fn ready(&self, now: Duration) -> bool {
        match self.last_update {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.min_interval,
        }
    }

    /// Offer a value; returns it if it may be applied now, otherwise holds it
    /// as the trailing value (replacing any older one)
    pub fn submit(&mut self, now: Duration, value: T) -> Option<T> {
        if self.ready(now) {
            self.last_update = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Trailing value, once the interval has passed
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_update = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop the trailing value
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Forget the last update so the next submit passes immediately
    pub fn reset(&mut self) {
        self.last_update = None;
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

// ============================================================================
// DEBOUNCER
// ============================================================================

/// Fires once `delay` has passed since the last trigger
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Duration>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Restart the delay
    pub fn trigger(&mut self, now: Duration) {
        self.last_change = Some(now);
    }

    /// True once per trigger, after the delay
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.last_change {
            Some(last) if now.saturating_sub(last) >= self.delay => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }

    /// Fire immediately if anything is pending
    pub fn flush(&mut self) -> bool {
        self.last_change.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.last_change = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance_ms(25);
        assert_eq!(other.now(), ms(25));
        other.set(ms(5));
        assert_eq!(clock.now(), ms(5));
    }

    #[test]
    fn test_rate_limiter_keeps_latest() {
        let mut limiter = RateLimiter::from_millis(16);
        assert_eq!(limiter.submit(ms(0), 1), Some(1));
        assert_eq!(limiter.submit(ms(5), 2), None);
        assert_eq!(limiter.submit(ms(10), 3), None);
        assert!(limiter.has_pending());

        assert_eq!(limiter.poll(ms(12)), None);
        assert_eq!(limiter.poll(ms(16)), Some(3));
        assert_eq!(limiter.poll(ms(40)), None);

        assert_eq!(limiter.submit(ms(40), 4), Some(4));
    }

    #[test]
    fn test_rate_limiter_cancel() {
        let mut limiter = RateLimiter::from_millis(16);
        limiter.submit(ms(0), 'a');
        limiter.submit(ms(1), 'b');
        assert_eq!(limiter.cancel(), Some('b'));
        assert_eq!(limiter.poll(ms(100)), None);

        limiter.reset();
        assert_eq!(limiter.submit(ms(101), 'c'), Some('c'));
    }

    #[test]
    fn test_debouncer_restarts_on_trigger() {
        let mut debounce = Debouncer::from_millis(50);
        assert!(!debounce.poll(ms(100)));

        debounce.trigger(ms(0));
        debounce.trigger(ms(30));
        assert!(!debounce.poll(ms(60)));
        assert!(debounce.poll(ms(80)));
        assert!(!debounce.poll(ms(200)));
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let mut debounce = Debouncer::from_millis(50);
        debounce.trigger(ms(0));
        assert!(debounce.flush());
        assert!(!debounce.flush());

        debounce.trigger(ms(10));
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.poll(ms(1000)));
    }
}
