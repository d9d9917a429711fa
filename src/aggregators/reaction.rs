//! Reaction task aggregation
//!
//! Combines reaction-time stability, answer accuracy and a fatigue trend that
//! compares the first and second halves of the question sequence.

use crate::aggregators::{component_score, finite_samples};
use crate::normalizer::{coefficient_of_variation, normalize_direct, normalize_inverse};
use crate::stats::mean;
use crate::types::{BasicStats, ReactionEvent, ReactionSummary};
use tracing::warn;

const STABILITY_CV_GOOD: f64 = 0.15;
const STABILITY_CV_BAD: f64 = 0.8;

const ACCURACY_BAD: f64 = 0.5;
const ACCURACY_GOOD: f64 = 0.9;

const DRIFT_GOOD: f64 = 0.1;
const DRIFT_BAD: f64 = 0.6;

/// Minimum timed events before a trend is computed
const MIN_TREND_EVENTS: usize = 4;

pub struct ReactionAggregator;

impl ReactionAggregator {
    /// Aggregate reaction-time statistics, accuracy and trend into a sub-score
    pub fn aggregate(events: &[&ReactionEvent]) -> ReactionSummary {
        let times = finite_samples("reaction_time_ms", events.iter().map(|e| e.reaction_time_ms));
        let stats = BasicStats::from_values(&times);

        let accuracy = compute_accuracy(events);
        let cv = coefficient_of_variation(stats.avg_ms, stats.std_ms);
        let drift_ratio = compute_drift_ratio(events);

        let stability_component = normalize_inverse(cv, STABILITY_CV_GOOD, STABILITY_CV_BAD);
        let accuracy_component = normalize_direct(accuracy, ACCURACY_BAD, ACCURACY_GOOD);
        let trend_component = normalize_inverse(
            drift_ratio.map(|ratio| (ratio - 1.0).abs()),
            DRIFT_GOOD,
            DRIFT_BAD,
        );

        let score = component_score(&[stability_component, accuracy_component, trend_component]);

        ReactionSummary {
            stats,
            accuracy,
            cv,
            drift_ratio,
            stability_component,
            accuracy_component,
            trend_component,
            score,
        }
    }
}

/// Fraction of correct answers, `None` with no events
///
/// Untimed answers still count; answers with no recorded correctness do not.
fn compute_accuracy(events: &[&ReactionEvent]) -> Option<f64> {
    let answers: Vec<bool> = events.iter().filter_map(|e| e.is_correct).collect();
    if answers.len() < events.len() {
        warn!(
            metric = "is_correct",
            excluded = events.len() - answers.len(),
            "excluded missing samples"
        );
    }
    if answers.is_empty() {
        return None;
    }
    let correct = answers.iter().filter(|&&c| c).count();
    Some(correct as f64 / answers.len() as f64)
}

/// Ratio of second-half to first-half mean reaction time
///
/// Events are ordered by `question_index` first. Returns `None` when there are
/// too few timed events or the first-half mean is not positive, which leaves
/// the trend component neutral.
fn compute_drift_ratio(events: &[&ReactionEvent]) -> Option<f64> {
    let mut ordered: Vec<&ReactionEvent> = events.to_vec();
    ordered.sort_by_key(|e| e.question_index);

    let times: Vec<f64> = ordered
        .iter()
        .filter_map(|e| e.reaction_time_ms)
        .filter(|t| t.is_finite())
        .collect();

    if times.len() < MIN_TREND_EVENTS {
        return None;
    }

    let (first, second) = times.split_at(times.len() / 2);
    let first_mean = mean(first)?;
    if first_mean <= 0.0 {
        return None;
    }
    Some(mean(second)? / first_mean)
}
