use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Formats a millisecond duration for display.
///
/// Under a minute: `"42s"`. Under an hour: `"3m 5s"` with the seconds as
/// the remainder. An hour or more: `"2h 11m"` with no seconds. Zero or
/// negative input formats as `"0s"`.
#[must_use]
pub fn format_duration(ms: i64) -> String {
    if ms <= 0 {
        return "0s".to_string();
    }

    let seconds = ms / MS_PER_SECOND;
    let minutes = ms / MS_PER_MINUTE;
    let hours = ms / MS_PER_HOUR;

    if hours > 0 {
        return format!("{hours}h {}m", minutes % 60);
    }
    if minutes > 0 {
        return format!("{minutes}m {}s", seconds % 60);
    }
    format!("{seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_negative() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(-5_000), "0s");
    }

    #[test]
    fn test_seconds_only() {
        assert_eq!(format_duration(1), "0s");
        assert_eq!(format_duration(1_000), "1s");
        assert_eq!(format_duration(59_999), "59s");
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(format_duration(60_000), "1m 0s");
        assert_eq!(format_duration(90_000), "1m 30s");
        assert_eq!(format_duration(3_599_999), "59m 59s");
    }

    #[test]
    fn test_hours_drop_seconds() {
        assert_eq!(format_duration(3_600_000), "1h 0m");
        assert_eq!(format_duration(3_660_000), "1h 1m");
        assert_eq!(format_duration(7_890_000), "2h 11m");
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), fixed_now() + Duration::minutes(5));
    }
}
