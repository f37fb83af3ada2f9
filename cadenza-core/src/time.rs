//! Time and duration conversion utilities.
//!
//! The rendering element reports positions as floating point seconds, which
//! may be `NaN` or infinite before metadata is known. These helpers turn them
//! into [`Duration`]s with explicit saturation behavior.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Format as `minutes:seconds`, both parts floor-divided and unpadded
    /// (`185s` becomes `"3:5"`).
    fn to_clock_string(&self) -> String;
}

impl DurationExt for Duration {
    fn to_clock_string(&self) -> String {
        let secs = self.as_secs();
        format!("{}:{}", secs / 60, secs % 60)
    }
}

/// Convert element-reported seconds into a duration.
///
/// Negative and `NaN` values map to zero, infinite values (live streams) map
/// to `Duration::MAX`.
#[must_use]
pub fn duration_from_secs_lossy(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_string_is_unpadded() {
        assert_eq!(Duration::from_secs(185).to_clock_string(), "3:5");
        assert_eq!(Duration::from_secs(59).to_clock_string(), "0:59");
        assert_eq!(Duration::ZERO.to_clock_string(), "0:0");
    }

    #[test]
    fn test_clock_string_floors_fractions() {
        assert_eq!(Duration::from_millis(61_999).to_clock_string(), "1:1");
    }

    #[test]
    fn test_duration_from_secs_lossy() {
        assert_eq!(duration_from_secs_lossy(1.5), Duration::from_millis(1500));
        assert_eq!(duration_from_secs_lossy(-3.0), Duration::ZERO);
        assert_eq!(duration_from_secs_lossy(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_secs_lossy(f64::INFINITY), Duration::MAX);
    }
}
