//! # Throttle
//!
//! A timestamp-gated guard used to rate limit repeated actions, most commonly warnings issued
//! every cycle while some condition persists.
//!
//! ```
//! use std::time::Duration;
//! use util::throttle::Throttle;
//!
//! let mut throttle = Throttle::new(Duration::from_secs(2));
//! assert!(throttle.ready());
//! assert!(!throttle.ready());
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Allows an action at most once per period.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    period: Duration,
    last: Option<Instant>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Throttle {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: None
        }
    }

    /// Create a throttle from a period in seconds. Negative or non-finite periods disable the
    /// throttling.
    pub fn from_secs_f64(period_s: f64) -> Self {
        Self::new(crate::time::seconds_to_duration(period_s))
    }

    /// Returns `true` if the action may be performed now, marking it as performed.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    /// As [`Throttle::ready`] but at an explicit instant.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        let allowed = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.period,
            None => true
        };

        if allowed {
            self.last = Some(now);
        }

        allowed
    }

    /// Forget the last action, so that the next call to `ready` succeeds.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_throttle_period() {
        let mut t = Throttle::new(Duration::from_secs(2));
        let t0 = Instant::now();

        assert!(t.ready_at(t0));
        assert!(!t.ready_at(t0 + Duration::from_millis(500)));
        assert!(!t.ready_at(t0 + Duration::from_millis(1999)));
        assert!(t.ready_at(t0 + Duration::from_secs(2)));
        assert!(!t.ready_at(t0 + Duration::from_millis(2100)));
        assert!(t.ready_at(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut t = Throttle::new(Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(t.ready_at(t0));
        assert!(!t.ready_at(t0 + Duration::from_secs(1)));
        t.reset();
        assert!(t.ready_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_period() {
        let mut t = Throttle::from_secs_f64(-1.0);
        let t0 = Instant::now();

        assert_eq!(t.period(), Duration::from_secs(0));
        assert!(t.ready_at(t0));
        assert!(t.ready_at(t0));
    }
}
