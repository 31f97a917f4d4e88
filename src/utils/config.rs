//! Configuration and constants for the estimator and the CLI.

/// Current JSON summary schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// External tool that reports per-event record sizes
pub const DEFAULT_ESTIMATOR_COMMAND: &str = "otf2-estimator";

/// Environment variable overriding the estimator command
pub const ESTIMATOR_ENV_VAR: &str = "TRACE_SCORE_ESTIMATOR";

// Memory formula: a 2 MiB floor for the buffer plus definitions,
// and another 2 MiB per location of the busiest process
pub const MEMORY_UNIT_BYTES: u64 = 2 * 1024 * 1024;

/// Largest SCOREP_TOTAL_MEMORY value the measurement system accepts
pub const MAX_REPRESENTABLE_MEMORY: u64 = u32::MAX as u64;

/// Upper bound for the number of dense metrics recorded per event
pub const MAX_DENSE_METRICS: u64 = 64;

// Filter-definition file framing
pub const FILTER_FILE_HEADER: &str = "#this file is generated bei scoreQt";
pub const FILTER_BLOCK_BEGIN: &str = "SCOREP_REGION_NAMES_BEGIN";
pub const FILTER_EXCLUDE_MANGLED: &str = "EXCLUDE MANGLED";
pub const FILTER_BLOCK_END: &str = "SCOREP_REGION_NAMES_END";

/// Extension appended to filter files written by the CLI
pub const FILTER_FILE_EXTENSION: &str = "filter";

// Human-readable byte formatting
pub const BYTE_UNITS: &[&str] = &["bytes", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
pub const BYTE_UNIT_BASE: u64 = 1024;
pub const BYTE_UNIT_THRESHOLD: u64 = 4 * BYTE_UNIT_BASE;

/// Options for one estimator run
///
/// **Public** - built by the CLI, consumed by `Estimator::new`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Number of dense metrics recorded with every enter/leave event
    pub dense_metrics: u64,

    /// Command line of the event-size estimator
    pub estimator_command: String,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            dense_metrics: 0,
            estimator_command: DEFAULT_ESTIMATOR_COMMAND.to_string(),
        }
    }
}

impl EstimatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dense_metrics(mut self, dense_metrics: u64) -> Self {
        self.dense_metrics = dense_metrics;
        self
    }

    pub fn with_estimator_command(mut self, command: impl Into<String>) -> Self {
        self.estimator_command = command.into();
        self
    }
}
