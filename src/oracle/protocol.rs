//! Line protocol spoken with the event-size estimator.
//!
//! Request:
//! ```text
//! set Region <N>
//! set Metric <M>
//! get <event>        (one per registered event)
//! exit
//! ```
//! Response: `<event name, may contain spaces> <bytes>` per line.

use crate::events::EventCatalog;
use log::debug;
use std::fmt::Write;

/// Build the request for every event of the catalog, in catalog order
///
/// **Public** - input written to the estimator's stdin
pub fn build_request(catalog: &EventCatalog, region_count: u64, metric_count: u64) -> String {
    let mut request = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(request, "set Region {}", region_count);
    let _ = writeln!(request, "set Metric {}", metric_count);
    for name in catalog.names() {
        let _ = writeln!(request, "get {}", name);
    }
    request.push_str("exit\n");
    request
}

/// Parse one response line, splitting at the last space
///
/// Returns `None` for lines without a space or with a non-numeric size.
pub fn parse_response_line(line: &str) -> Option<(&str, u64)> {
    let line = line.trim_end_matches('\r');
    let (name, number) = line.rsplit_once(' ')?;
    let bytes = number.parse::<u64>().ok()?;
    Some((name, bytes))
}

/// Parse a whole response, skipping lines that do not parse
pub fn parse_response(response: &str) -> Vec<(&str, u64)> {
    response.lines().filter_map(parse_response_line).collect()
}

/// Apply a response to the catalog
///
/// **Public** - unknown event names are ignored
///
/// # Returns
/// Number of events whose size was set
pub fn apply_response(catalog: &mut EventCatalog, response: &str) -> usize {
    let mut applied = 0;
    for (name, bytes) in parse_response(response) {
        if catalog.set_size(name, bytes) {
            applied += 1;
        } else {
            debug!("Ignoring size for unknown event: {}", name);
        }
    }
    applied
}
