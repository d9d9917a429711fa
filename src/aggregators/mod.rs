//! Per-task aggregators
//!
//! Each aggregator consumes the events of one task kind and produces task-level
//! statistics together with normalized sub-score components.

mod code;
mod reaction;
mod reading;

pub use code::CodeAggregator;
pub use reaction::ReactionAggregator;
pub use reading::ReadingAggregator;

use crate::types::{CodeSubmissionEvent, Event, ReactionEvent, ReadingSegmentEvent};
use tracing::warn;

/// Session events split by task kind, borrowing from an immutable snapshot
#[derive(Debug, Default)]
pub struct TaskEvents<'a> {
    pub reading: Vec<&'a ReadingSegmentEvent>,
    pub reaction: Vec<&'a ReactionEvent>,
    pub code: Vec<&'a CodeSubmissionEvent>,
}

impl<'a> TaskEvents<'a> {
    /// Partition events by kind, preserving their relative order
    pub fn partition<I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut split = Self::default();
        for event in events {
            match event {
                Event::Reading(e) => split.reading.push(e),
                Event::Reaction(e) => split.reaction.push(e),
                Event::Code(e) => split.code.push(e),
            }
        }
        split
    }
}

/// Keep only present, finite samples; anything else is a malformed metric and is excluded
pub(crate) fn finite_samples<I>(metric: &str, values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut samples = Vec::new();
    let mut excluded = 0usize;
    for value in values {
        match value {
            Some(v) if v.is_finite() => samples.push(v),
            _ => excluded += 1,
        }
    }
    if excluded > 0 {
        warn!(metric, excluded, "excluded missing or non-finite samples");
    }
    samples
}

/// Mean of the available components, scaled to 0-100
pub(crate) fn component_score(components: &[f64]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let avg = components.iter().sum::<f64>() / components.len() as f64;
    (avg * 100.0).clamp(0.0, 100.0)
}
