//! Event store
//!
//! Append-only log of stored events, queryable by session. The JSON file store
//! keeps every record in a single pretty-printed array, rewritten on append.

use crate::error::ComputeError;
use crate::schema::EventRecordAdapter;
use crate::types::StoredEvent;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default location of the JSON event file
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Append-only event log
pub trait EventStore {
    /// Append one record to the end of the log
    fn append(&mut self, record: StoredEvent) -> Result<(), ComputeError>;

    /// All records for a session, in append order
    fn list_by_session(&self, session_id: &str) -> Result<Vec<StoredEvent>, ComputeError>;
}

/// In-memory event store
#[derive(Debug, Default, Clone)]
pub struct MemoryEventStore {
    records: Vec<StoredEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EventStore for MemoryEventStore {
    fn append(&mut self, record: StoredEvent) -> Result<(), ComputeError> {
        self.records.push(record);
        Ok(())
    }

    fn list_by_session(&self, session_id: &str) -> Result<Vec<StoredEvent>, ComputeError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.event.session_id() == session_id)
            .cloned()
            .collect())
    }
}

/// Event store backed by a JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileEventStore {
    path: PathBuf,
}

impl Default for JsonFileEventStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_FILE)
    }
}

impl JsonFileEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file; a missing file is an empty log
    ///
    /// Fails on the first unreadable record.
    pub fn load_all(&self) -> Result<Vec<StoredEvent>, ComputeError> {
        self.read_values()?
            .into_iter()
            .enumerate()
            .map(|(index, value)| EventRecordAdapter::parse_stored(index, value))
            .collect()
    }

    fn read_values(&self) -> Result<Vec<Value>, ComputeError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl EventStore for JsonFileEventStore {
    fn append(&mut self, record: StoredEvent) -> Result<(), ComputeError> {
        // Existing records are kept as raw values so older entries are rewritten untouched
        let mut values = self.read_values()?;
        values.push(serde_json::to_value(&record)?);

        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;

        debug!(
            path = %self.path.display(),
            event_id = %record.event_id,
            kind = record.event.kind().as_str(),
            session_id = record.event.session_id(),
            "appended event"
        );
        Ok(())
    }

    fn list_by_session(&self, session_id: &str) -> Result<Vec<StoredEvent>, ComputeError> {
        let mut records = Vec::new();
        for (index, value) in self.read_values()?.into_iter().enumerate() {
            match EventRecordAdapter::parse_stored(index, value) {
                Ok(record) if record.event.session_id() == session_id => records.push(record),
                Ok(_) => {}
                // Unreadable records are skipped; load_all reports them
                Err(e) => warn!(index, error = %e, "skipping unreadable stored record"),
            }
        }

        debug!(session_id, count = records.len(), "listed session events");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, ReactionEvent, ReadingSegmentEvent};

    fn reaction(session_id: &str, question_index: i64) -> StoredEvent {
        StoredEvent::new(Event::Reaction(ReactionEvent {
            session_id: session_id.to_string(),
            question_index,
            reaction_time_ms: Some(300.0 + question_index as f64),
            is_correct: Some(true),
            chosen_option_index: Some(0),
            client_timestamp_ms: None,
        }))
    }

    #[test]
    fn test_memory_store_filters_by_session() {
        let mut store = MemoryEventStore::new();
        store.append(reaction("a", 0)).unwrap();
        store.append(reaction("b", 0)).unwrap();
        store.append(reaction("a", 1)).unwrap();

        let listed = store.list_by_session("a").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(listed.len(), 2);
        assert!(store.list_by_session("missing").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileEventStore::new(dir.path().join("data.json"));
        assert!(store.list_by_session("a").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_append_and_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = JsonFileEventStore::new(&path);

        let first = reaction("a", 2);
        let second = reaction("a", 1);
        store.append(first.clone()).unwrap();
        store.append(reaction("b", 0)).unwrap();
        store.append(second.clone()).unwrap();

        let listed = store.list_by_session("a").unwrap();
        assert_eq!(listed, vec![first, second]);

        // Another handle on the same file sees the same log
        let reopened = JsonFileEventStore::new(&path);
        assert_eq!(reopened.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_file_store_skips_unreadable_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"[
  {"session_id": "s", "segment_id": 1, "question_index": 1, "reading_time_ms": 5900.0},
  {"session_id": "s", "segment_id": 2, "text_length": 500, "reading_time_ms": 6100.0}
]"#,
        )
        .unwrap();

        let store = JsonFileEventStore::new(&path);
        assert_eq!(store.list_by_session("s").unwrap().len(), 1);
        assert!(store.load_all().is_err());
    }

    #[test]
    fn test_file_store_keeps_records_with_null_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"[
  {"session_id": "s", "question_index": 0, "reaction_time_ms": 300.0, "is_correct": true},
  {"session_id": "s", "question_index": 1, "reaction_time_ms": null, "is_correct": false},
  {"session_id": "s", "question_index": 2, "reaction_time_ms": 300.0, "is_correct": true}
]"#,
        )
        .unwrap();

        let store = JsonFileEventStore::new(&path);
        let events: Vec<Event> = store
            .list_by_session("s")
            .unwrap()
            .into_iter()
            .map(|r| r.event)
            .collect();
        assert_eq!(events.len(), 3);

        let summary = crate::pipeline::compute_summary(&events).unwrap();
        assert_eq!(summary.reaction.stats.count, 2);
        assert!((summary.reaction.accuracy.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_file_store_ids_are_stable_across_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"[
  {"session_id": "old", "segment_id": 1, "text_length": 500, "reading_time_ms": 8000.0},
  {"session_id": "old", "segment_id": 1, "text_length": 500, "reading_time_ms": 8000.0}
]"#,
        )
        .unwrap();

        let store = JsonFileEventStore::new(&path);
        let ids = |records: Vec<StoredEvent>| -> Vec<uuid::Uuid> {
            records.into_iter().map(|r| r.event_id).collect()
        };
        let first = ids(store.list_by_session("old").unwrap());
        let second = ids(store.list_by_session("old").unwrap());

        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
        assert_eq!(ids(store.load_all().unwrap()), first);
    }

    #[test]
    fn test_file_store_reads_untagged_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"[
  {"session_id": "old", "segment_id": 1, "text_length": 500, "reading_time_ms": 8000.0},
  {"session_id": "old", "question_index": 0, "reaction_time_ms": 420.0, "is_correct": true}
]"#,
        )
        .unwrap();

        let mut store = JsonFileEventStore::new(&path);
        store
            .append(StoredEvent::new(Event::Reading(ReadingSegmentEvent {
                session_id: "old".to_string(),
                segment_id: 2,
                text_length: 480,
                reading_time_ms: Some(7600.0),
                client_timestamp_ms: None,
            })))
            .unwrap();

        let listed = store.list_by_session("old").unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed[0].received_at.is_none());
        assert!(listed[2].received_at.is_some());

        // Untagged records are left as written
        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw[0].get("kind").is_none());
        assert_eq!(raw[2]["kind"], "reading");
    }
}
