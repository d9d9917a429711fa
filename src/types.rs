//! Core types for the concentration profile pipeline
//!
//! This module defines the task events recorded for a session, the persisted
//! record envelope, and the summary structures produced by the aggregators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Task kind discriminant, set when an event is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Reading,
    Reaction,
    Code,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Reading => "reading",
            TaskKind::Reaction => "reaction",
            TaskKind::Code => "code",
        }
    }
}

/// Reading segment event: time spent on one segment of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSegmentEvent {
    pub session_id: String,
    pub segment_id: i64,
    /// Number of characters in the segment
    pub text_length: u64,
    /// Required on new events; stored records may carry `null`
    #[serde(default)]
    pub reading_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp_ms: Option<f64>,
}

/// Reaction event: answer to one reaction-time question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub session_id: String,
    pub question_index: i64,
    #[serde(default)]
    pub reaction_time_ms: Option<f64>,
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_option_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp_ms: Option<f64>,
}

/// Code submission event, carrying grading outputs attached before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSubmissionEvent {
    pub session_id: String,
    pub exercise_id: String,
    pub code: String,
    #[serde(default)]
    pub total_time_ms: Option<f64>,
    /// Delay between exercise display and the first keystroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_key_delay_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_code_length: Option<i64>,
    /// Time between first and last keystroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_passed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_failed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_error: Option<String>,
}

/// A behavioral task event, tagged with its task kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Reading(ReadingSegmentEvent),
    Reaction(ReactionEvent),
    Code(CodeSubmissionEvent),
}

impl Event {
    pub fn kind(&self) -> TaskKind {
        match self {
            Event::Reading(_) => TaskKind::Reading,
            Event::Reaction(_) => TaskKind::Reaction,
            Event::Code(_) => TaskKind::Code,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Event::Reading(e) => &e.session_id,
            Event::Reaction(e) => &e.session_id,
            Event::Code(e) => &e.session_id,
        }
    }

    pub fn client_timestamp_ms(&self) -> Option<f64> {
        match self {
            Event::Reading(e) => e.client_timestamp_ms,
            Event::Reaction(e) => e.client_timestamp_ms,
            Event::Code(e) => e.client_timestamp_ms,
        }
    }
}

/// Persisted record envelope around an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    /// Server-side receipt time (absent for records written by older clients)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub event: Event,
}

impl StoredEvent {
    /// Wrap an event with a fresh id and the current receipt time
    pub fn new(event: Event) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            received_at: Some(Utc::now()),
            event,
        }
    }
}

/// Descriptive statistics over a sequence of durations in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub count: usize,
    pub avg_ms: Option<f64>,
    pub std_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

/// Reading task summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSummary {
    pub stats: BasicStats,
    /// Coefficient of variation of reading times
    pub cv: Option<f64>,
    /// Stability component (0-1)
    pub stability: f64,
    /// Reading sub-score (0-100)
    pub score: f64,
}

/// Reaction task summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub stats: BasicStats,
    pub accuracy: Option<f64>,
    pub cv: Option<f64>,
    /// Second-half over first-half mean reaction time, when computable
    pub drift_ratio: Option<f64>,
    pub stability_component: f64,
    pub accuracy_component: f64,
    pub trend_component: f64,
    /// Reaction sub-score (0-100)
    pub score: f64,
}

/// Per-exercise code breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseBreakdown {
    pub count: usize,
    pub success_rate: Option<f64>,
    pub avg_total_time_ms: Option<f64>,
    pub avg_first_key_delay_ms: Option<f64>,
    /// Mean typing rate in characters per second
    pub avg_typing_rate_cps: Option<f64>,
}

/// Code task summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSummary {
    pub count: usize,
    pub success_rate: Option<f64>,
    pub total_time: BasicStats,
    pub avg_typing_rate_cps: Option<f64>,
    pub typing_rate_samples: usize,
    pub first_key_delay_std_ms: Option<f64>,
    pub tests_passed_total: u32,
    pub tests_failed_total: u32,
    pub grading_errors: usize,
    pub per_exercise: BTreeMap<String, ExerciseBreakdown>,
    pub success_component: f64,
    pub typing_component: f64,
    pub first_key_component: f64,
    /// Code sub-score (0-100)
    pub score: f64,
}

/// Weighted fusion of the three task sub-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationProfile {
    pub overall_score: f64,
    pub reading_score: f64,
    pub reaction_score: f64,
    pub code_score: f64,
    /// Normalized (0-1) components that fed the sub-scores
    pub components: BTreeMap<String, f64>,
    pub comment: String,
}

/// Full per-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub session_id: String,
    pub event_count: usize,
    pub reading: ReadingSummary,
    pub reaction: ReactionSummary,
    pub code: CodeSummary,
    pub profile: ConcentrationProfile,
}
