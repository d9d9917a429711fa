//! Metric normalization
//!
//! Maps raw metrics onto a bounded 0-1 desirability scale. Every function here
//! is total: missing, NaN or out-of-range input never panics, and any
//! insufficient-data path resolves to [`NEUTRAL_SCORE`].

/// Neutral desirability used whenever a metric cannot be computed
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Resolve an optional component to its value, or the neutral score
pub fn neutral_or(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => NEUTRAL_SCORE,
    }
}

/// Normalize a metric where smaller values are better
///
/// `good_low` and below maps to 1.0, `bad_high` and above maps to 0.0, with
/// linear interpolation in between.
pub fn normalize_inverse(value: Option<f64>, good_low: f64, bad_high: f64) -> f64 {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return neutral_or(None);
    };

    if v <= good_low {
        return 1.0;
    }
    if v >= bad_high {
        return 0.0;
    }
    (1.0 - (v - good_low) / (bad_high - good_low)).clamp(0.0, 1.0)
}

/// Normalize a metric where larger values are better
///
/// `bad_low` and below maps to 0.0, `good_high` and above maps to 1.0.
pub fn normalize_direct(value: Option<f64>, bad_low: f64, good_high: f64) -> f64 {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return neutral_or(None);
    };

    if v <= bad_low {
        return 0.0;
    }
    if v >= good_high {
        return 1.0;
    }
    ((v - bad_low) / (good_high - bad_low)).clamp(0.0, 1.0)
}

/// Coefficient of variation (`std / avg`)
///
/// Undefined, and therefore `None`, when the mean is missing or not positive.
pub fn coefficient_of_variation(avg: Option<f64>, std: Option<f64>) -> Option<f64> {
    match (avg, std) {
        (Some(avg), Some(std)) if avg > 0.0 => Some(std / avg),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_neutral() {
        assert_eq!(normalize_inverse(None, 0.1, 0.7), NEUTRAL_SCORE);
        assert_eq!(normalize_direct(None, 0.5, 0.9), NEUTRAL_SCORE);
        assert_eq!(normalize_inverse(Some(f64::NAN), 0.1, 0.7), NEUTRAL_SCORE);
        assert_eq!(normalize_direct(Some(f64::NAN), 0.5, 0.9), NEUTRAL_SCORE);
        assert_eq!(neutral_or(Some(0.8)), 0.8);
    }

    #[test]
    fn test_inverse_endpoints_and_interpolation() {
        assert_eq!(normalize_inverse(Some(0.0), 0.1, 0.7), 1.0);
        assert_eq!(normalize_inverse(Some(0.1), 0.1, 0.7), 1.0);
        assert_eq!(normalize_inverse(Some(0.7), 0.1, 0.7), 0.0);
        assert_eq!(normalize_inverse(Some(5.0), 0.1, 0.7), 0.0);

        // Midpoint of [0.1, 0.7]
        assert!((normalize_inverse(Some(0.4), 0.1, 0.7) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_direct_endpoints_and_interpolation() {
        assert_eq!(normalize_direct(Some(0.2), 0.5, 0.9), 0.0);
        assert_eq!(normalize_direct(Some(0.95), 0.5, 0.9), 1.0);
        assert!((normalize_direct(Some(7.0), 2.0, 12.0) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut prev_inverse = f64::INFINITY;
        let mut prev_direct = f64::NEG_INFINITY;

        for i in 0..=100 {
            let x = i as f64 * 0.01;
            let inv = normalize_inverse(Some(x), 0.15, 0.8);
            let dir = normalize_direct(Some(x), 0.3, 0.9);

            assert!((0.0..=1.0).contains(&inv));
            assert!((0.0..=1.0).contains(&dir));
            assert!(inv <= prev_inverse);
            assert!(dir >= prev_direct);

            prev_inverse = inv;
            prev_direct = dir;
        }

        assert_eq!(normalize_inverse(Some(f64::INFINITY), 0.1, 0.6), 0.0);
        assert_eq!(normalize_direct(Some(f64::NEG_INFINITY), 2.0, 12.0), 0.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(Some(200.0), Some(50.0)), Some(0.25));
        assert_eq!(coefficient_of_variation(Some(0.0), Some(10.0)), None);
        assert_eq!(coefficient_of_variation(Some(-5.0), Some(1.0)), None);
        assert_eq!(coefficient_of_variation(None, Some(1.0)), None);
        assert_eq!(coefficient_of_variation(Some(10.0), None), None);
    }
}
