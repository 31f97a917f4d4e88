//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod events;
pub mod filter;
pub mod score;
pub mod utils;

// Re-export main command functions
pub use events::{execute_events, EventsArgs};
pub use filter::{apply_exclusions, execute_filter, FilterArgs};
pub use score::{execute_score, ScoreArgs};
pub use utils::display_version;
