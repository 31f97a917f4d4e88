//! JSON score summary writer.
//!
//! Writes the size figures and tables of a run for scripts and CI.

use crate::estimator::{Estimator, GroupRow, RegionRow, SizeSummary};
use crate::filter::FilterStateEngine;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Group row as written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub max_buf: u64,
    pub visits: u64,
    pub time_s: f64,
    pub time_percent: f64,
    pub time_per_visit_us: f64,
}

impl From<&GroupRow> for GroupSummary {
    fn from(row: &GroupRow) -> Self {
        Self {
            kind: row.group.name().to_string(),
            max_buf: row.metrics.max_buf,
            visits: row.metrics.visits,
            time_s: row.metrics.time_s,
            time_percent: row.metrics.time_percent,
            time_per_visit_us: row.metrics.time_per_visit,
        }
    }
}

/// Region row as written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub name: String,
    pub mangled_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub max_buf: u64,
    pub visits: u64,
    pub time_s: f64,
    pub time_percent: f64,
    pub time_per_visit_us: f64,
    pub excluded: bool,
}

impl RegionSummary {
    fn new(row: &RegionRow, excluded: bool) -> Self {
        Self {
            name: row.name.clone(),
            mangled_name: row.mangled_name.clone(),
            kind: row.group.name().to_string(),
            max_buf: row.metrics.max_buf,
            visits: row.metrics.visits,
            time_s: row.metrics.time_s,
            time_percent: row.metrics.time_percent,
            time_per_visit_us: row.metrics.time_per_visit,
            excluded,
        }
    }
}

/// Everything one run reports
///
/// **Public** - the JSON document of `trace-score score --json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub version: String,
    pub profile: String,
    pub sizes: SizeSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_sizes: Option<SizeSummary>,
    pub groups: Vec<GroupSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<RegionSummary>,
    pub generated_at: String,
}

impl ScoreSummary {
    /// Build the summary of an estimate
    ///
    /// # Arguments
    /// * `profile` - Shown as the input path
    /// * `estimator` - Source of the unfiltered tables
    /// * `filter` - Adds the filtered sizes and marks excluded regions
    /// * `include_regions` - Add the region table
    pub fn new(
        profile: impl Into<String>,
        estimator: &Estimator,
        filter: Option<&FilterStateEngine>,
        include_regions: bool,
    ) -> Self {
        let regions = match (include_regions, filter) {
            (false, _) => Vec::new(),
            (true, Some(f)) => f
                .regions()
                .iter()
                .map(|entry| RegionSummary::new(&entry.row, !entry.included))
                .collect(),
            (true, None) => estimator
                .region_table()
                .iter()
                .map(|row| RegionSummary::new(row, false))
                .collect(),
        };

        Self {
            version: SCHEMA_VERSION.to_string(),
            profile: profile.into(),
            sizes: estimator.sizes(),
            filtered_sizes: filter.filter(|f| f.has_filtered()).map(|f| f.filtered_sizes()),
            groups: estimator.group_table().iter().map(GroupSummary::from).collect(),
            regions,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Write a summary to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(summary: &ScoreSummary, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing summary to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, summary).map_err(OutputError::SerializationFailed)?;
    writer.flush()?;

    info!(
        "Summary written successfully ({} bytes)",
        std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0)
    );

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Read a summary back from a JSON file
///
/// **Public** - useful for comparing runs and for tests
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<ScoreSummary, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading summary from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let summary: ScoreSummary =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Summary loaded: version {}, profile {}",
        summary.version, summary.profile
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_summary() -> ScoreSummary {
        ScoreSummary {
            version: SCHEMA_VERSION.to_string(),
            profile: "profile.json".to_string(),
            sizes: SizeSummary {
                trace_size: 1000,
                max_buf: 600,
                total_memory: 4 * 1024 * 1024,
            },
            filtered_sizes: None,
            groups: vec![GroupSummary {
                kind: "ALL".to_string(),
                max_buf: 600,
                visits: 25,
                time_s: 1.5,
                time_percent: 100.0,
                time_per_visit_us: 60000.0,
            }],
            regions: vec![],
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_summary() {
        let summary = create_test_summary();
        let temp_file = NamedTempFile::new().unwrap();

        write_summary(&summary, temp_file.path()).unwrap();
        let loaded = read_summary(temp_file.path()).unwrap();

        assert_eq!(loaded, summary);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_string(&create_test_summary()).unwrap();
        assert!(!json.contains("filtered_sizes"));
        assert!(!json.contains("regions"));
        assert!(json.contains("\"type\":\"ALL\""));
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/summary.json");

        write_summary(&create_test_summary(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
