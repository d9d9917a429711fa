//! Reading task aggregation

use crate::aggregators::{component_score, finite_samples};
use crate::normalizer::{coefficient_of_variation, normalize_inverse};
use crate::types::{BasicStats, ReadingSegmentEvent, ReadingSummary};

/// CV at or below this is perfectly stable reading
const STABILITY_CV_GOOD: f64 = 0.1;

/// CV at or above this is fully unstable reading
const STABILITY_CV_BAD: f64 = 0.7;

pub struct ReadingAggregator;

impl ReadingAggregator {
    /// Aggregate reading-time statistics and the stability score
    pub fn aggregate(events: &[&ReadingSegmentEvent]) -> ReadingSummary {
        let times = finite_samples("reading_time_ms", events.iter().map(|e| e.reading_time_ms));
        let stats = BasicStats::from_values(&times);

        let cv = coefficient_of_variation(stats.avg_ms, stats.std_ms);
        let stability = normalize_inverse(cv, STABILITY_CV_GOOD, STABILITY_CV_BAD);

        ReadingSummary {
            stats,
            cv,
            stability,
            score: component_score(&[stability]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(segment_id: i64, reading_time_ms: f64) -> ReadingSegmentEvent {
        ReadingSegmentEvent {
            session_id: "reading-test".to_string(),
            segment_id,
            text_length: 500,
            reading_time_ms: Some(reading_time_ms),
            client_timestamp_ms: None,
        }
    }

    #[test]
    fn test_constant_reading_times_score_full() {
        let events = [segment(1, 100.0), segment(2, 100.0), segment(3, 100.0)];
        let refs: Vec<&ReadingSegmentEvent> = events.iter().collect();

        let summary = ReadingAggregator::aggregate(&refs);
        assert_eq!(summary.stats.std_ms, Some(0.0));
        assert_eq!(summary.cv, Some(0.0));
        assert_eq!(summary.score, 100.0);
    }

    #[test]
    fn test_no_reading_events_is_neutral() {
        let summary = ReadingAggregator::aggregate(&[]);
        assert_eq!(summary.stats.count, 0);
        assert!(summary.cv.is_none());
        assert!((summary.score - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_variable_reading_times() {
        // Mean 200, population std 100 -> CV 0.5 -> 1 - 0.4/0.6
        let events = [segment(1, 100.0), segment(2, 300.0)];
        let refs: Vec<&ReadingSegmentEvent> = events.iter().collect();

        let summary = ReadingAggregator::aggregate(&refs);
        assert!((summary.cv.unwrap() - 0.5).abs() < 0.001);
        assert!((summary.score - 100.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_malformed_times_are_excluded() {
        let mut untimed = segment(4, 0.0);
        untimed.reading_time_ms = None;
        let events = [segment(1, 100.0), segment(2, f64::NAN), segment(3, 100.0), untimed];
        let refs: Vec<&ReadingSegmentEvent> = events.iter().collect();

        let summary = ReadingAggregator::aggregate(&refs);
        assert_eq!(summary.stats.count, 2);
        assert_eq!(summary.score, 100.0);
    }
}
