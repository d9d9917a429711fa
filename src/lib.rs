//! Concentration Profile - Aggregation and scoring engine for behavioral task sessions
//!
//! Turns the reading, reaction-time and code-writing events recorded for one
//! session into descriptive statistics, normalized sub-scores and a weighted
//! concentration profile through a deterministic pipeline: event partitioning
//! → per-task aggregation → normalization → profile composition.
//!
//! ## Modules
//!
//! - **Aggregators**: Per-task statistics and sub-scores (reading, reaction, code)
//! - **Profile**: Weighted fusion of sub-scores with commentary
//! - **Store**: Append-only event log (in-memory or JSON file)

pub mod aggregators;
pub mod error;
pub mod grading;
pub mod normalizer;
pub mod pipeline;
pub mod profile;
pub mod schema;
pub mod stats;
pub mod store;
pub mod types;

pub use error::ComputeError;
pub use pipeline::{compute_summary, SummaryProcessor};
pub use store::{EventStore, JsonFileEventStore, MemoryEventStore};
pub use types::{ConcentrationProfile, Event, StoredEvent, Summary};

// Schema exports
pub use schema::{EventRecordAdapter, ValidationError};

/// Engine version embedded in CLI reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "concentration-profile";
