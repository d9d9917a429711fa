//! Adapter for parsing task event records
//!
//! Records carry an explicit `kind` tag. Records written without one (the flat
//! format of older clients) are classified by their discriminating field, and
//! rejected unless exactly one of `segment_id`, `question_index` or
//! `exercise_id` is present.

use crate::error::ComputeError;
use crate::schema::ValidationError;
use crate::types::{
    CodeSubmissionEvent, Event, ReactionEvent, ReadingSegmentEvent, StoredEvent, TaskKind,
};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

/// Field whose presence identifies each task kind in an untagged record
const DISCRIMINATORS: [(&str, TaskKind); 3] = [
    ("segment_id", TaskKind::Reading),
    ("question_index", TaskKind::Reaction),
    ("exercise_id", TaskKind::Code),
];

/// Adapter for converting JSON records into events
pub struct EventRecordAdapter;

impl EventRecordAdapter {
    /// Parse a JSON array of event records
    pub fn parse_array(json: &str) -> Result<Vec<Event>, ComputeError> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        values.into_iter().map(Self::parse_event).collect()
    }

    /// Parse NDJSON (one event record per line)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Event>, ComputeError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(trimmed).map_err(|e| {
                ComputeError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            events.push(Self::parse_event(value)?);
        }
        Ok(events)
    }

    /// Parse one record, tagged or untagged, into an event
    pub fn parse_event(value: Value) -> Result<Event, ComputeError> {
        if value.get("kind").is_some() {
            return Ok(serde_json::from_value(value)?);
        }

        let event = match Self::classify_untagged(&value)? {
            TaskKind::Reading => Event::Reading(serde_json::from_value::<ReadingSegmentEvent>(value)?),
            TaskKind::Reaction => Event::Reaction(serde_json::from_value::<ReactionEvent>(value)?),
            TaskKind::Code => Event::Code(serde_json::from_value::<CodeSubmissionEvent>(value)?),
        };
        Ok(event)
    }

    /// Parse the persisted record at `index` in the log
    ///
    /// Untagged records keep whatever envelope fields they carry. Records
    /// without an `event_id` get one derived from their position and content,
    /// so repeated reads of the same log yield the same ids.
    pub fn parse_stored(index: usize, value: Value) -> Result<StoredEvent, ComputeError> {
        if value.get("event_id").is_some() && value.get("kind").is_some() {
            return Ok(serde_json::from_value(value)?);
        }

        let event_id = match value.get("event_id") {
            Some(id) => serde_json::from_value(id.clone())?,
            None => legacy_event_id(index, &value),
        };
        let received_at = match value.get("received_at") {
            Some(at) if !at.is_null() => Some(serde_json::from_value(at.clone())?),
            _ => None,
        };

        Ok(StoredEvent {
            event_id,
            received_at,
            event: Self::parse_event(value)?,
        })
    }

    /// Classify an untagged record by its discriminating field
    pub fn classify_untagged(value: &Value) -> Result<TaskKind, ComputeError> {
        let matches: Vec<TaskKind> = DISCRIMINATORS
            .iter()
            .filter(|(field, _)| value.get(field).is_some_and(|v| !v.is_null()))
            .map(|(_, kind)| *kind)
            .collect();

        match matches.as_slice() {
            [kind] => Ok(*kind),
            [] => {
                warn!("untagged record has no discriminating field");
                Err(ComputeError::AmbiguousRecord(
                    "record has none of segment_id, question_index, exercise_id".to_string(),
                ))
            }
            many => {
                let kinds: Vec<&str> = many.iter().map(TaskKind::as_str).collect();
                warn!(kinds = ?kinds, "untagged record matches several task kinds");
                Err(ComputeError::AmbiguousRecord(format!(
                    "record matches several task kinds: {}",
                    kinds.join(", ")
                )))
            }
        }
    }

    /// Validate a batch of events, returning only the failures
    pub fn validate_events(events: &[Event]) -> Vec<ValidationResult> {
        events
            .iter()
            .enumerate()
            .filter_map(|(idx, event)| {
                event.validate().err().map(|error| ValidationResult {
                    index: idx,
                    session_id: event.session_id().to_string(),
                    kind: event.kind(),
                    error,
                })
            })
            .collect()
    }
}

fn legacy_event_id(index: usize, value: &Value) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{index}:{value}").as_bytes())
}

/// A failed validation within a batch
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub session_id: String,
    pub kind: TaskKind,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tagged_event() {
        let value = json!({
            "kind": "reading",
            "session_id": "s1",
            "segment_id": 3,
            "text_length": 812,
            "reading_time_ms": 15234.5
        });

        let event = EventRecordAdapter::parse_event(value).unwrap();
        assert_eq!(event.kind(), TaskKind::Reading);
    }

    #[test]
    fn test_parse_untagged_records() {
        let reading = json!({
            "session_id": "s1",
            "segment_id": 0,
            "text_length": 640,
            "reading_time_ms": 9800.0
        });
        let reaction = json!({
            "session_id": "s1",
            "question_index": 4,
            "reaction_time_ms": 412.0,
            "is_correct": false
        });
        let code = json!({
            "session_id": "s1",
            "exercise_id": "reverse_string",
            "code": "def reverse_string(s):\n    return s[::-1]",
            "total_time_ms": 51000.0,
            "is_correct": true,
            "tests_passed": 3,
            "tests_failed": 0,
            "grading_error": null
        });

        assert_eq!(
            EventRecordAdapter::parse_event(reading).unwrap().kind(),
            TaskKind::Reading
        );
        assert_eq!(
            EventRecordAdapter::parse_event(reaction).unwrap().kind(),
            TaskKind::Reaction
        );
        assert_eq!(
            EventRecordAdapter::parse_event(code).unwrap().kind(),
            TaskKind::Code
        );
    }

    #[test]
    fn test_ambiguous_untagged_record_rejected() {
        let both = json!({
            "session_id": "s1",
            "segment_id": 1,
            "question_index": 1,
            "reading_time_ms": 100.0
        });
        let neither = json!({ "session_id": "s1" });

        assert!(matches!(
            EventRecordAdapter::parse_event(both),
            Err(ComputeError::AmbiguousRecord(_))
        ));
        assert!(matches!(
            EventRecordAdapter::parse_event(neither),
            Err(ComputeError::AmbiguousRecord(_))
        ));
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = r#"{"kind":"reaction","session_id":"s1","question_index":0,"reaction_time_ms":300.0,"is_correct":true}

not json"#;

        let err = EventRecordAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_stored_wraps_untagged() {
        let value = json!({
            "session_id": "s1",
            "question_index": 2,
            "reaction_time_ms": 350.0,
            "is_correct": true
        });

        let stored = EventRecordAdapter::parse_stored(0, value.clone()).unwrap();
        assert!(stored.received_at.is_none());
        assert_eq!(stored.event.session_id(), "s1");

        let again = EventRecordAdapter::parse_stored(0, value.clone()).unwrap();
        assert_eq!(again.event_id, stored.event_id);

        // Identical content at another position is a different record
        let elsewhere = EventRecordAdapter::parse_stored(1, value).unwrap();
        assert_ne!(elsewhere.event_id, stored.event_id);
    }

    #[test]
    fn test_parse_stored_keeps_envelope_of_untagged_record() {
        let value = json!({
            "event_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "received_at": "2024-03-01T10:15:00Z",
            "session_id": "s1",
            "segment_id": 4,
            "text_length": 300,
            "reading_time_ms": 4200.0
        });

        let stored = EventRecordAdapter::parse_stored(7, value).unwrap();
        assert_eq!(
            stored.event_id.to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
        assert!(stored.received_at.is_some());
        assert_eq!(stored.event.kind(), TaskKind::Reading);
    }

    #[test]
    fn test_validate_events_returns_failures_only() {
        let events = EventRecordAdapter::parse_array(
            r#"[
                {"kind":"reading","session_id":"s1","segment_id":0,"text_length":10,"reading_time_ms":100.0},
                {"kind":"reading","session_id":"","segment_id":1,"text_length":10,"reading_time_ms":100.0}
            ]"#,
        )
        .unwrap();

        let failures = EventRecordAdapter::validate_events(&events);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].error, ValidationError::EmptySessionId);
    }
}
