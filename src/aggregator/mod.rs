//! Aggregation of profile measurements into trace buffer sizes.
//!
//! This module transforms a flat profile into:
//! - Per-region trace bytes per visit
//! - Per-process buffer requirements for regions and groups
//! - Visit and time totals

pub mod accumulator;
pub mod regions;

// Re-export main types and functions
pub use accumulator::Accumulator;
pub use regions::{aggregate, Aggregation, RegionAggregate};
