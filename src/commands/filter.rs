//! Filter command implementation.
//!
//! The filter command:
//! 1. Loads and estimates the profile
//! 2. Applies the requested exclusions
//! 3. Prints the sizes with and without the filter
//! 4. Writes the Score-P filter file

use super::utils::{load_estimator, validate_estimator_config};
use crate::filter::{FilterStateEngine, TriState};
use crate::output::{render_score_report, render_size_table, size_advisory};
use crate::profile::Group;
use crate::utils::config::{EstimatorConfig, FILTER_FILE_EXTENSION};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

/// Arguments for the filter command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct FilterArgs {
    /// Path to the JSON profile
    pub profile: PathBuf,

    /// Groups to exclude
    pub exclude_groups: Vec<Group>,

    /// Regions to exclude, by display name
    pub exclude_regions: Vec<String>,

    /// Exclude every filterable region
    pub exclude_all: bool,

    /// Filter file path, defaults to the profile path with a `.filter` extension
    pub output: Option<PathBuf>,

    /// Print the region table as well
    pub show_regions: bool,

    pub config: EstimatorConfig,
}

impl Default for FilterArgs {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("profile.json"),
            exclude_groups: Vec::new(),
            exclude_regions: Vec::new(),
            exclude_all: false,
            output: None,
            show_regions: false,
            config: EstimatorConfig::default(),
        }
    }
}

impl FilterArgs {
    /// Where the filter file goes
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.profile.with_extension(FILTER_FILE_EXTENSION))
    }
}

/// Execute the filter command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Profile load failures
/// * Unknown or non-filterable groups and regions
/// * Filter file write errors
pub fn execute_filter(args: FilterArgs) -> Result<()> {
    info!("Filtering profile: {}", args.profile.display());
    let estimator = load_estimator(&args.profile, &args.config)?;

    let mut engine = FilterStateEngine::new(&estimator);
    apply_exclusions(&mut engine, &args)?;

    println!();
    println!(
        "{}",
        render_size_table(&engine.sizes(), Some(&engine.filtered_sizes()))
    );
    print!("{}", render_score_report(&estimator, Some(&engine), args.show_regions));
    println!();

    let output = args.output_path();
    let written = engine
        .write_filter_file(&output)
        .with_context(|| format!("Failed to write filter file {}", output.display()))?;
    if !written {
        info!("No regions excluded, no filter file written");
    }

    print!(
        "{}",
        size_advisory(
            written.then_some(output.as_path()),
            engine.filtered_sizes().total_memory
        )
    );
    Ok(())
}

/// Apply the exclusions of `args` to a fresh engine
///
/// **Public** - entries that are already excluded stay excluded, and
/// `-g FLT` excludes every filterable region like `--exclude-all`
///
/// # Errors
/// * Group or region without a row in the tables
/// * Group or region that cannot be excluded
pub fn apply_exclusions(engine: &mut FilterStateEngine, args: &FilterArgs) -> Result<()> {
    if args.exclude_all || args.exclude_groups.contains(&Group::Flt) {
        debug!("Excluding every filterable region");
        engine.exclude_all_filterable_regions();
    }

    // FLT is handled above, toggling it would clear the filter
    for &group in args.exclude_groups.iter().filter(|g| **g != Group::Flt) {
        let key = engine
            .group_key(group)
            .with_context(|| format!("Group {} has no regions in this profile", group))?;
        if engine.group_state(group) == Some(TriState::Excluded) {
            continue;
        }
        engine
            .toggle_group(key)
            .with_context(|| format!("Failed to exclude group {}", group))?;
    }

    for name in &args.exclude_regions {
        let key = engine
            .region_key(name)
            .with_context(|| format!("Region not found: {}", name))?;
        if !engine.regions()[key].included {
            continue;
        }
        engine
            .toggle_region(key)
            .with_context(|| format!("Failed to exclude region {}", name))?;
    }

    info!("{} regions excluded", engine.excluded().len());
    Ok(())
}

/// Validate filter arguments
///
/// **Public** - can be called before execute_filter for early validation
pub fn validate_args(args: &FilterArgs) -> Result<()> {
    validate_estimator_config(&args.config)?;

    if args.profile.as_os_str().is_empty() {
        anyhow::bail!("Profile path cannot be empty");
    }

    if let Some(path) = &args.output {
        if path.as_os_str().is_empty() {
            anyhow::bail!("Filter file path cannot be empty");
        }
    }

    if let Some(group) = args.exclude_groups.iter().find(|g| !g.is_filterable()) {
        anyhow::bail!("Group {} cannot be excluded", group);
    }

    Ok(())
}
