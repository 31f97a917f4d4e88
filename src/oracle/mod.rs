//! Event-size estimator communication.
//!
//! The measurement system's own tool knows the encoded size of every
//! trace record. We ask it once per run through a small text protocol.

pub mod client;
pub mod protocol;

// Re-export main types and functions
pub use client::{calculate_event_sizes, EventSizeOracle, StaticOracle, SubprocessOracle};
pub use protocol::{apply_response, build_request, parse_response, parse_response_line};
