//! Read-only access to a flat performance profile.

use super::schema::{CallNode, ProfileDocument};
use crate::utils::error::ProfileError;
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Source of per-region, per-process measurements
///
/// **Public** - the estimator only sees profiles through this trait
pub trait Profile {
    fn region_count(&self) -> usize;

    fn process_count(&self) -> usize;

    fn region_name(&self, region: usize) -> &str;

    fn mangled_name(&self, region: usize) -> &str;

    /// Exclusive visit count of `region` on `process`
    fn visits(&self, region: usize, process: usize) -> u64;

    /// Exclusive time of `region` on `process`, in seconds
    fn time(&self, region: usize, process: usize) -> f64;

    /// Size of the profile file in bytes
    fn file_size(&self) -> u64;

    /// Largest number of locations (threads) of any process
    fn max_locations_per_process(&self) -> u64;

    fn metric_count(&self) -> u64;

    fn call_tree(&self) -> &[CallNode];
}

/// Profile backed by a `ProfileDocument`
#[derive(Debug, Clone)]
pub struct JsonProfile {
    document: ProfileDocument,
    file_size: u64,
}

impl JsonProfile {
    /// Load a profile from a JSON file
    ///
    /// **Public** - main entry point for reading profiles
    ///
    /// # Errors
    /// * `ProfileError::ReadFailed` - file cannot be opened or stat'ed
    /// * `ProfileError::JsonError` - invalid JSON structure
    /// * `ProfileError::Inconsistent` - measurement rows do not match the definitions
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        info!("Loading profile: {}", path.display());

        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let document: ProfileDocument = serde_json::from_reader(BufReader::new(file))?;

        Self::from_document(document, file_size)
    }

    /// Build a profile from an in-memory document
    ///
    /// `file_size` feeds the definition-size estimate of the memory formula.
    pub fn from_document(document: ProfileDocument, file_size: u64) -> Result<Self, ProfileError> {
        validate_document(&document)?;

        debug!(
            "Profile has {} regions, {} processes, {} metrics ({} bytes)",
            document.regions.len(),
            document.processes.len(),
            document.metrics.len(),
            file_size
        );

        Ok(Self {
            document,
            file_size,
        })
    }

    pub fn document(&self) -> &ProfileDocument {
        &self.document
    }
}

impl Profile for JsonProfile {
    fn region_count(&self) -> usize {
        self.document.regions.len()
    }

    fn process_count(&self) -> usize {
        self.document.processes.len()
    }

    fn region_name(&self, region: usize) -> &str {
        &self.document.regions[region].name
    }

    fn mangled_name(&self, region: usize) -> &str {
        let definition = &self.document.regions[region];
        definition.mangled_name.as_deref().unwrap_or(&definition.name)
    }

    fn visits(&self, region: usize, process: usize) -> u64 {
        self.document
            .visits
            .get(region)
            .and_then(|row| row.get(process))
            .copied()
            .unwrap_or(0)
    }

    fn time(&self, region: usize, process: usize) -> f64 {
        self.document
            .time
            .get(region)
            .and_then(|row| row.get(process))
            .copied()
            .unwrap_or(0.0)
    }

    fn file_size(&self) -> u64 {
        self.file_size
    }

    fn max_locations_per_process(&self) -> u64 {
        self.document
            .processes
            .iter()
            .map(|p| p.locations)
            .max()
            .unwrap_or(0)
    }

    fn metric_count(&self) -> u64 {
        self.document.metrics.len() as u64
    }

    fn call_tree(&self) -> &[CallNode] {
        &self.document.call_tree
    }
}

/// Check that measurement matrices match the definitions
///
/// Empty `visits`/`time` matrices are accepted and read as zeros.
fn validate_document(document: &ProfileDocument) -> Result<(), ProfileError> {
    let regions = document.regions.len();
    let processes = document.processes.len();

    check_matrix("visits", document.visits.iter().map(Vec::len), document.visits.len(), regions, processes)?;
    check_matrix("time", document.time.iter().map(Vec::len), document.time.len(), regions, processes)?;

    if let Some((region, process)) = find_invalid_time(document) {
        return Err(ProfileError::Inconsistent(format!(
            "time of region {} on process {} is not a finite, non-negative number",
            region, process
        )));
    }

    Ok(())
}

fn check_matrix(
    name: &str,
    row_lengths: impl Iterator<Item = usize>,
    rows: usize,
    regions: usize,
    processes: usize,
) -> Result<(), ProfileError> {
    if rows == 0 {
        return Ok(());
    }

    if rows != regions {
        return Err(ProfileError::Inconsistent(format!(
            "{} has {} rows but the profile defines {} regions",
            name, rows, regions
        )));
    }

    for (region, len) in row_lengths.enumerate() {
        if len != processes {
            return Err(ProfileError::Inconsistent(format!(
                "{} row {} has {} values but the profile defines {} processes",
                name, region, len, processes
            )));
        }
    }

    Ok(())
}

fn find_invalid_time(document: &ProfileDocument) -> Option<(usize, usize)> {
    document.time.iter().enumerate().find_map(|(region, row)| {
        row.iter()
            .position(|t| !t.is_finite() || *t < 0.0)
            .map(|process| (region, process))
    })
}
