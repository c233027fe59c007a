//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a loop rate in Hz into the period of one cycle.
///
/// Non-positive or non-finite rates produce `None`, as do rates so small the period overflows.
pub fn rate_to_period(rate_hz: f64) -> Option<std::time::Duration> {
    if rate_hz.is_finite() && rate_hz > 0.0 {
        std::time::Duration::try_from_secs_f64(1.0 / rate_hz).ok()
    } else {
        None
    }
}

/// Convert a number of seconds into a duration.
///
/// Negative or non-finite values produce a zero duration, values too large for a duration
/// saturate at `Duration::MAX`.
pub fn seconds_to_duration(seconds: f64) -> std::time::Duration {
    if seconds.is_finite() && seconds > 0.0 {
        std::time::Duration::try_from_secs_f64(seconds).unwrap_or(std::time::Duration::MAX)
    } else {
        std::time::Duration::from_secs(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rate_to_period() {
        assert_eq!(
            rate_to_period(10.0),
            Some(std::time::Duration::from_millis(100))
        );
        assert_eq!(rate_to_period(0.0), None);
        assert_eq!(rate_to_period(-5.0), None);
        assert_eq!(rate_to_period(f64::NAN), None);
        assert_eq!(rate_to_period(1e-300), None);
    }

    #[test]
    fn test_seconds_to_duration() {
        use std::time::Duration;

        assert_eq!(seconds_to_duration(1.5), Duration::from_millis(1500));
        assert_eq!(seconds_to_duration(-1.0), Duration::from_secs(0));
        assert_eq!(seconds_to_duration(f64::INFINITY), Duration::from_secs(0));

        // Finite but beyond what a duration can hold
        assert_eq!(seconds_to_duration(1e20), Duration::MAX);
        assert_eq!(seconds_to_duration(f64::MAX), Duration::MAX);
    }

    #[test]
    fn test_duration_to_seconds() {
        let d = chrono::Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(d), Some(1.5));
    }
}
