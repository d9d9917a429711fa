//! Code grading collaborator contract
//!
//! Grading runs outside this crate; it must attach its outcome to each code
//! submission before the event reaches the store. This module defines the
//! exercise catalog, the pre-grading submission payload and the [`Grader`]
//! seam. [`CatalogGrader`] only checks submissions against the catalog.

use crate::types::CodeSubmissionEvent;
use serde::{Deserialize, Serialize};

/// Exercises offered by the code task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseId {
    AddTwo,
    ReverseString,
    SumList,
}

impl ExerciseId {
    pub const ALL: [ExerciseId; 3] = [
        ExerciseId::AddTwo,
        ExerciseId::ReverseString,
        ExerciseId::SumList,
    ];

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseId::AddTwo => "add_two",
            ExerciseId::ReverseString => "reverse_string",
            ExerciseId::SumList => "sum_list",
        }
    }

    /// Name of the function the submission must define
    pub fn function_name(&self) -> &'static str {
        self.as_str()
    }

    /// Number of test cases the grader runs
    pub fn test_case_count(&self) -> u32 {
        3
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExerciseId::AddTwo => "add_two(x): return x plus two",
            ExerciseId::ReverseString => "reverse_string(s): return s reversed",
            ExerciseId::SumList => "sum_list(lst): return the sum of the list",
        }
    }
}

/// Code submission as sent by the client, before grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSubmission {
    pub session_id: String,
    pub exercise_id: String,
    pub code: String,
    #[serde(default)]
    pub total_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_key_delay_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_code_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_duration_ms: Option<f64>,
}

/// Strip any client-supplied grading fields, leaving the submission to regrade
impl From<CodeSubmissionEvent> for CodeSubmission {
    fn from(event: CodeSubmissionEvent) -> Self {
        Self {
            session_id: event.session_id,
            exercise_id: event.exercise_id,
            code: event.code,
            total_time_ms: event.total_time_ms,
            first_key_delay_ms: event.first_key_delay_ms,
            client_timestamp_ms: event.client_timestamp_ms,
            code_length: event.code_length,
            starter_code_length: event.starter_code_length,
            typing_duration_ms: event.typing_duration_ms,
        }
    }
}

/// Result reported by a grader for one submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub is_correct: Option<bool>,
    pub tests_passed: Option<u32>,
    pub tests_failed: Option<u32>,
    pub error: Option<String>,
}

impl CodeSubmission {
    /// Attach a grading outcome, producing the event that gets stored
    pub fn into_event(self, outcome: GradingOutcome) -> CodeSubmissionEvent {
        CodeSubmissionEvent {
            session_id: self.session_id,
            exercise_id: self.exercise_id,
            code: self.code,
            total_time_ms: self.total_time_ms,
            first_key_delay_ms: self.first_key_delay_ms,
            client_timestamp_ms: self.client_timestamp_ms,
            code_length: self.code_length,
            starter_code_length: self.starter_code_length,
            typing_duration_ms: self.typing_duration_ms,
            is_correct: outcome.is_correct,
            tests_passed: outcome.tests_passed,
            tests_failed: outcome.tests_failed,
            grading_error: outcome.error,
        }
    }
}

/// Grades code submissions
pub trait Grader {
    fn grade(&self, submission: &CodeSubmission) -> GradingOutcome;
}

/// Grader that only checks the exercise catalog and never executes code
///
/// Unknown exercises fail with zero tests passed; known exercises are left
/// ungraded for an external grader to fill in.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogGrader;

impl Grader for CatalogGrader {
    fn grade(&self, submission: &CodeSubmission) -> GradingOutcome {
        match ExerciseId::parse(&submission.exercise_id) {
            Some(_) => GradingOutcome::default(),
            None => GradingOutcome {
                is_correct: Some(false),
                tests_passed: Some(0),
                tests_failed: None,
                error: Some(format!("Unknown exercise_id: {}", submission.exercise_id)),
            },
        }
    }
}
