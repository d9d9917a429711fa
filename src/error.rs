//! Error types for the concentration profile engine

use crate::schema::ValidationError;
use thiserror::Error;

/// Errors that can occur while recording events or computing a summary
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse event payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Event store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No events recorded for session: {0}")]
    NoEventsForSession(String),

    #[error("Cannot classify stored record: {0}")]
    AmbiguousRecord(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] ValidationError),
}
