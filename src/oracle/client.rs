//! Clients for the event-size estimator.

use super::protocol::{apply_response, build_request, parse_response};
use crate::events::EventCatalog;
use crate::utils::error::OracleError;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::{Builder, NamedTempFile};

/// Something that answers size requests
///
/// **Public** - the estimator calls this exactly once, synchronously
pub trait EventSizeOracle {
    /// Send a full request and return the raw response text
    fn query(&self, request: &str) -> Result<String, OracleError>;
}

/// Runs an external estimator with request and response in temporary files
///
/// The call blocks until the process exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct SubprocessOracle {
    command: String,
}

impl SubprocessOracle {
    /// Create a client for `command` (program followed by optional arguments)
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Command line this client runs
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl EventSizeOracle for SubprocessOracle {
    fn query(&self, request: &str) -> Result<String, OracleError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(OracleError::EmptyCommand)?;

        let mut input = scratch_file()?;
        input.write_all(request.as_bytes())?;
        input.flush()?;
        let output = scratch_file()?;

        debug!(
            "Running {} < {} > {}",
            self.command,
            input.path().display(),
            output.path().display()
        );

        let status = Command::new(program)
            .args(parts)
            .stdin(Stdio::from(File::open(input.path())?))
            .stdout(Stdio::from(output.reopen()?))
            .status()
            .map_err(|source| OracleError::LaunchFailed {
                command: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(OracleError::ExitStatus {
                command: self.command.clone(),
                status: status.to_string(),
            });
        }

        // Both scratch files are removed on drop
        Ok(std::fs::read_to_string(output.path())?)
    }
}

fn scratch_file() -> Result<NamedTempFile, OracleError> {
    let prefix = match std::env::var("USER") {
        Ok(user) => format!("trace-score_{}_{}_", user, std::process::id()),
        Err(_) => format!("trace-score_{}_", std::process::id()),
    };
    Ok(Builder::new().prefix(&prefix).tempfile()?)
}

/// Answers from a fixed table of sizes
///
/// Used when the real estimator is not available, mostly in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    sizes: BTreeMap<String, u64>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, event: impl Into<String>, bytes: u64) -> Self {
        self.sizes.insert(event.into(), bytes);
        self
    }
}

impl EventSizeOracle for StaticOracle {
    fn query(&self, request: &str) -> Result<String, OracleError> {
        let mut response = String::new();
        for name in request.lines().filter_map(|line| line.strip_prefix("get ")) {
            if let Some(bytes) = self.sizes.get(name) {
                response.push_str(&format!("{} {}\n", name, bytes));
            }
        }
        Ok(response)
    }
}

/// Fill the catalog's event sizes from the oracle
///
/// **Public** - failures are logged and leave sizes at zero
///
/// # Returns
/// Number of events that received a size
pub fn calculate_event_sizes(
    catalog: &mut EventCatalog,
    region_count: u64,
    metric_count: u64,
    oracle: &dyn EventSizeOracle,
) -> usize {
    let request = build_request(catalog, region_count, metric_count);

    match oracle.query(&request) {
        Ok(response) => {
            let applied = apply_response(catalog, &response);
            info!(
                "Event sizes: {} of {} events known ({} response lines)",
                applied,
                catalog.len(),
                parse_response(&response).len()
            );
            applied
        }
        Err(e) => {
            warn!("Failed to query event sizes, estimates will be too low: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::standard_catalog;

    #[test]
    fn test_static_oracle_answers_known_events() {
        let oracle = StaticOracle::new().with_size("Enter", 12).with_size("Timestamp", 8);
        let response = oracle.query("set Region 1\nget Enter\nget Leave\nget Timestamp\nexit\n").unwrap();
        assert_eq!(response, "Enter 12\nTimestamp 8\n");
    }

    #[test]
    fn test_calculate_event_sizes_static() {
        let mut catalog = standard_catalog(0);
        let oracle = StaticOracle::new()
            .with_size("Enter", 12)
            .with_size("Leave", 12)
            .with_size("Timestamp", 8);

        let applied = calculate_event_sizes(&mut catalog, 2, 2, &oracle);

        assert_eq!(applied, 3);
        assert_eq!(catalog.size_of("Timestamp"), 16);
        assert_eq!(catalog.bytes_per_visit("foo"), 40);
    }

    #[test]
    fn test_missing_command_keeps_zero_sizes() {
        let mut catalog = standard_catalog(0);
        let oracle = SubprocessOracle::new("trace-score-no-such-estimator-binary");

        let applied = calculate_event_sizes(&mut catalog, 1, 1, &oracle);

        assert_eq!(applied, 0);
        assert_eq!(catalog.bytes_per_visit("foo"), 0);
    }

    #[test]
    fn test_empty_command() {
        let oracle = SubprocessOracle::new("   ");
        assert!(matches!(oracle.query("exit\n"), Err(OracleError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_round_trip() {
        // `cat` echoes the request; only lines shaped like "<name> <n>" survive parsing
        let oracle = SubprocessOracle::new("cat");
        let response = oracle.query("set Region 4\nget Enter\nexit\n").unwrap();
        assert_eq!(response, "set Region 4\nget Enter\nexit\n");

        let mut catalog = EventCatalog::new();
        assert_eq!(apply_response(&mut catalog, &response), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_failure_status() {
        let oracle = SubprocessOracle::new("false");
        assert!(matches!(oracle.query("exit\n"), Err(OracleError::ExitStatus { .. })));
    }
}
