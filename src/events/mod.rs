//! Trace event catalog.
//!
//! This module defines:
//! - Events and the predicates deciding which regions trigger them
//! - The `EventCatalog` registry with per-event record sizes
//! - The standard rule set of the measurement system

pub mod catalog;
pub mod rules;

// Re-export main types
pub use catalog::{Event, EventCatalog, EventPredicate};
pub use rules::standard_catalog;
