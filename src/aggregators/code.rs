//! Code task aggregation
//!
//! Scores code submissions on grading success, typing rate and the consistency
//! of the delay before the first keystroke, with a per-exercise breakdown.

use crate::aggregators::{component_score, finite_samples};
use crate::normalizer::{normalize_direct, normalize_inverse};
use crate::stats::{mean, population_std};
use crate::types::{BasicStats, CodeSubmissionEvent, CodeSummary, ExerciseBreakdown};
use std::collections::BTreeMap;

const SUCCESS_BAD: f64 = 0.3;
const SUCCESS_GOOD: f64 = 0.9;

/// Typing rate bounds in characters per second
const TYPING_RATE_BAD: f64 = 2.0;
const TYPING_RATE_GOOD: f64 = 12.0;

/// First-key delay standard deviation bounds in milliseconds
const FIRST_KEY_STD_GOOD: f64 = 1500.0;
const FIRST_KEY_STD_BAD: f64 = 6000.0;

pub struct CodeAggregator;

impl CodeAggregator {
    /// Aggregate code submissions into a sub-score and per-exercise breakdown
    pub fn aggregate(events: &[&CodeSubmissionEvent]) -> CodeSummary {
        let success_rate = compute_success_rate(events);

        let rates: Vec<f64> = events.iter().filter_map(|e| typing_rate_cps(e)).collect();
        let avg_typing_rate_cps = mean(&rates);

        let first_key_delays = first_key_delays(events);
        let first_key_delay_std_ms = if first_key_delays.len() >= 2 {
            population_std(&first_key_delays)
        } else {
            None
        };

        let total_times = finite_samples("total_time_ms", events.iter().map(|e| e.total_time_ms));

        let success_component = normalize_direct(success_rate, SUCCESS_BAD, SUCCESS_GOOD);
        let typing_component =
            normalize_direct(avg_typing_rate_cps, TYPING_RATE_BAD, TYPING_RATE_GOOD);
        let first_key_component =
            normalize_inverse(first_key_delay_std_ms, FIRST_KEY_STD_GOOD, FIRST_KEY_STD_BAD);

        CodeSummary {
            count: events.len(),
            success_rate,
            total_time: BasicStats::from_values(&total_times),
            avg_typing_rate_cps,
            typing_rate_samples: rates.len(),
            first_key_delay_std_ms,
            tests_passed_total: events.iter().filter_map(|e| e.tests_passed).sum(),
            tests_failed_total: events.iter().filter_map(|e| e.tests_failed).sum(),
            grading_errors: events.iter().filter(|e| e.grading_error.is_some()).count(),
            per_exercise: breakdown_by_exercise(events),
            success_component,
            typing_component,
            first_key_component,
            score: component_score(&[success_component, typing_component, first_key_component]),
        }
    }
}

/// Typing rate in characters per second for one submission
///
/// Only submissions that added characters over positive, finite typing time
/// produce a sample. A missing starter length counts as an empty starter.
pub fn typing_rate_cps(event: &CodeSubmissionEvent) -> Option<f64> {
    let code_length = event.code_length?;
    let starter_length = event.starter_code_length.unwrap_or(0);
    let duration_ms = event.typing_duration_ms.filter(|d| d.is_finite() && *d > 0.0)?;

    let delta = code_length.checked_sub(starter_length)?;
    if delta <= 0 {
        return None;
    }
    Some(delta as f64 / (duration_ms / 1000.0))
}

fn compute_success_rate(events: &[&CodeSubmissionEvent]) -> Option<f64> {
    if events.is_empty() {
        return None;
    }
    let correct = events.iter().filter(|e| e.is_correct == Some(true)).count();
    Some(correct as f64 / events.len() as f64)
}

fn first_key_delays(events: &[&CodeSubmissionEvent]) -> Vec<f64> {
    // Optional field; only recorded delays are candidates
    finite_samples(
        "first_key_delay_ms",
        events
            .iter()
            .map(|e| e.first_key_delay_ms)
            .filter(Option::is_some),
    )
}

/// Same formulas as the aggregate, scoped to each exercise's submissions
fn breakdown_by_exercise(events: &[&CodeSubmissionEvent]) -> BTreeMap<String, ExerciseBreakdown> {
    let mut grouped: BTreeMap<&str, Vec<&CodeSubmissionEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.exercise_id.as_str()).or_default().push(*event);
    }

    grouped
        .into_iter()
        .map(|(exercise_id, subset)| {
            let total_times: Vec<f64> = subset
                .iter()
                .filter_map(|e| e.total_time_ms)
                .filter(|t| t.is_finite())
                .collect();
            let rates: Vec<f64> = subset.iter().filter_map(|e| typing_rate_cps(e)).collect();

            let breakdown = ExerciseBreakdown {
                count: subset.len(),
                success_rate: compute_success_rate(&subset),
                avg_total_time_ms: mean(&total_times),
                avg_first_key_delay_ms: mean(&first_key_delays(&subset)),
                avg_typing_rate_cps: mean(&rates),
            };
            (exercise_id.to_string(), breakdown)
        })
        .collect()
}
