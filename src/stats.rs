//! Basic descriptive statistics
//!
//! Count, mean, population standard deviation, min and max over a sequence of
//! durations.

use crate::types::BasicStats;

impl BasicStats {
    /// Statistics with no samples; every field except `count` is `None`
    pub fn empty() -> Self {
        Self {
            count: 0,
            avg_ms: None,
            std_ms: None,
            min_ms: None,
            max_ms: None,
        }
    }

    /// Compute statistics over `values`
    pub fn from_values(values: &[f64]) -> Self {
        let Some(avg) = mean(values) else {
            return Self::empty();
        };

        let (Some(min), Some(max)) = (
            values.iter().copied().min_by(f64::total_cmp),
            values.iter().copied().max_by(f64::total_cmp),
        ) else {
            return Self::empty();
        };

        // Summation error can push the mean just outside the sample range
        let avg = if min == max { min } else { avg.clamp(min, max) };

        Self {
            count: values.len(),
            avg_ms: Some(avg),
            std_ms: population_std(values),
            min_ms: Some(min),
            max_ms: Some(max),
        }
    }
}

/// Arithmetic mean, `None` for an empty sequence
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by N)
///
/// Equal samples (including a single sample) have a deviation of exactly 0.0.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if values.windows(2).all(|pair| pair[0] == pair[1]) {
        return Some(0.0);
    }

    let variance = values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
