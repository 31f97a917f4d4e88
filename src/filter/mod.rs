//! Region filtering.
//!
//! This module handles:
//! - Tri-state inclusion of groups and regions
//! - The FLT summary of excluded regions and the filtered sizes
//! - Writing Score-P filter files

pub mod export;
pub mod state;

// Re-export main types
pub use export::render_filter;
pub use state::{FilterStateEngine, GroupEntry, RegionEntry, TableKind, TriState};
