//! Output of score results.
//!
//! This module handles:
//! - The plain-text score report and size tables
//! - JSON summaries of a run

pub mod json;
pub mod report;

// Re-export main functions
pub use json::{read_summary, write_summary, GroupSummary, RegionSummary, ScoreSummary};
pub use report::{render_score_report, render_size_table, size_advisory};
