//! Event record schema
//!
//! Validation rules for task events and the adapter that parses stored or
//! submitted records, including older records written without a `kind` tag.

mod adapter;
mod validation;

pub use adapter::*;
pub use validation::*;
