//! Validation rules for task events

use crate::types::{CodeSubmissionEvent, Event, ReactionEvent, ReadingSegmentEvent};

/// Validation errors for task events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("session_id must not be empty")]
    EmptySessionId,

    #[error("{field} is required")]
    MissingMetric { field: &'static str },

    #[error("{field} must be a finite, non-negative number, got {value}")]
    InvalidMetric { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },
}

impl Event {
    /// Check the event against the data contract before it is stored
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_id().trim().is_empty() {
            return Err(ValidationError::EmptySessionId);
        }

        match self {
            Event::Reading(e) => validate_reading(e),
            Event::Reaction(e) => validate_reaction(e),
            Event::Code(e) => validate_code(e),
        }
    }
}

fn validate_reading(event: &ReadingSegmentEvent) -> Result<(), ValidationError> {
    check_duration("reading_time_ms", required("reading_time_ms", event.reading_time_ms)?)
}

fn validate_reaction(event: &ReactionEvent) -> Result<(), ValidationError> {
    check_duration("reaction_time_ms", required("reaction_time_ms", event.reaction_time_ms)?)?;
    required("is_correct", event.is_correct)?;
    Ok(())
}

fn validate_code(event: &CodeSubmissionEvent) -> Result<(), ValidationError> {
    check_duration("total_time_ms", required("total_time_ms", event.total_time_ms)?)?;

    if let Some(delay) = event.first_key_delay_ms {
        check_duration("first_key_delay_ms", delay)?;
    }
    if let Some(duration) = event.typing_duration_ms {
        check_duration("typing_duration_ms", duration)?;
    }
    if let Some(length) = event.code_length {
        check_count("code_length", length)?;
    }
    if let Some(length) = event.starter_code_length {
        check_count("starter_code_length", length)?;
    }
    Ok(())
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingMetric { field })
}

fn check_duration(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidMetric { field, value })
    }
}

fn check_count(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeCount { field, value })
    }
}
