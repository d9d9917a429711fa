//! Summary pipeline orchestration
//!
//! This module provides the public API for turning a session's event log into
//! task summaries and a concentration profile.

use crate::aggregators::{CodeAggregator, ReactionAggregator, ReadingAggregator, TaskEvents};
use crate::error::ComputeError;
use crate::grading::{CodeSubmission, Grader};
use crate::profile::ProfileComposer;
use crate::store::EventStore;
use crate::types::{Event, StoredEvent, Summary};
use tracing::{debug, warn};

/// Compute the full summary for one session's events (stateless, one-shot).
///
/// Events are expected in append order and are summarized for the session of
/// the first event; events from any other session are dropped with a warning.
/// Fails with [`ComputeError::NoEventsForSession`] when `events` is empty.
///
/// # Example
/// ```ignore
/// let summary = compute_summary(&events)?;
/// println!("{}", summary.profile.overall_score);
/// ```
pub fn compute_summary(events: &[Event]) -> Result<Summary, ComputeError> {
    let Some(first) = events.first() else {
        return Err(ComputeError::NoEventsForSession(String::new()));
    };
    let session_id = first.session_id().to_string();

    let foreign = events
        .iter()
        .filter(|e| e.session_id() != session_id)
        .count();
    if foreign > 0 {
        warn!(session_id = %session_id, foreign, "ignoring events from other sessions");
    }

    // Stage 1: Split by task kind
    let tasks = TaskEvents::partition(events.iter().filter(|e| e.session_id() == session_id));
    debug!(
        session_id = %session_id,
        reading = tasks.reading.len(),
        reaction = tasks.reaction.len(),
        code = tasks.code.len(),
        "partitioned session events"
    );

    // Stage 2: Per-task aggregation
    let reading = ReadingAggregator::aggregate(&tasks.reading);
    let reaction = ReactionAggregator::aggregate(&tasks.reaction);
    let code = CodeAggregator::aggregate(&tasks.code);

    // Stage 3: Compose profile
    let profile = ProfileComposer::compose(&reading, &reaction, &code);
    debug!(
        session_id = %session_id,
        overall = profile.overall_score,
        "composed concentration profile"
    );

    Ok(Summary {
        session_id,
        event_count: events.len() - foreign,
        reading,
        reaction,
        code,
        profile,
    })
}

/// Stateful processor that records events into a store and summarizes sessions
pub struct SummaryProcessor<S: EventStore> {
    store: S,
}

impl<S: EventStore> SummaryProcessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and append an event, returning the stored record
    pub fn record(&mut self, event: Event) -> Result<StoredEvent, ComputeError> {
        event.validate()?;

        let stored = StoredEvent::new(event);
        self.store.append(stored.clone())?;
        Ok(stored)
    }

    /// Grade a code submission, attach the outcome and record it
    pub fn record_code_submission(
        &mut self,
        submission: CodeSubmission,
        grader: &dyn Grader,
    ) -> Result<StoredEvent, ComputeError> {
        let outcome = grader.grade(&submission);
        self.record(Event::Code(submission.into_event(outcome)))
    }

    /// Record an incoming event, regrading code submissions first
    ///
    /// Grading fields sent with a code event are discarded and replaced by the
    /// grader's outcome.
    pub fn ingest(
        &mut self,
        event: Event,
        grader: &dyn Grader,
    ) -> Result<StoredEvent, ComputeError> {
        match event {
            Event::Code(code) => self.record_code_submission(CodeSubmission::from(code), grader),
            other => self.record(other),
        }
    }

    /// Summarize every event recorded for a session
    pub fn summary(&self, session_id: &str) -> Result<Summary, ComputeError> {
        let events: Vec<Event> = self
            .store
            .list_by_session(session_id)?
            .into_iter()
            .map(|record| record.event)
            .collect();

        if events.is_empty() {
            return Err(ComputeError::NoEventsForSession(session_id.to_string()));
        }
        compute_summary(&events)
    }

    /// Summarize a session as pretty-printed JSON
    pub fn summary_json(&self, session_id: &str) -> Result<String, ComputeError> {
        let summary = self.summary(session_id)?;
        serde_json::to_string_pretty(&summary).map_err(ComputeError::JsonError)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
