//! Score command implementation.
//!
//! The score command:
//! 1. Loads the profile
//! 2. Estimates trace sizes
//! 3. Prints the score report
//! 4. Writes the JSON summary (optional)

use super::utils::{load_estimator, validate_estimator_config};
use crate::output::{render_score_report, write_summary, ScoreSummary};
use crate::utils::config::EstimatorConfig;
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the score command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ScoreArgs {
    /// Path to the JSON profile
    pub profile: PathBuf,

    /// Print the region table as well
    pub show_regions: bool,

    pub config: EstimatorConfig,

    /// Output path for the JSON summary (optional)
    pub output_json: Option<PathBuf>,
}

impl Default for ScoreArgs {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("profile.json"),
            show_regions: false,
            config: EstimatorConfig::default(),
            output_json: None,
        }
    }
}

/// Execute the score command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Profile load failures
/// * JSON write errors
pub fn execute_score(args: ScoreArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Scoring profile: {}", args.profile.display());
    let estimator = load_estimator(&args.profile, &args.config)?;

    print!("{}", render_score_report(&estimator, None, args.show_regions));

    if let Some(path) = &args.output_json {
        let summary = ScoreSummary::new(
            args.profile.display().to_string(),
            &estimator,
            None,
            args.show_regions,
        );
        write_summary(&summary, path).context("Failed to write JSON summary")?;
        info!("✓ Summary written to: {}", path.display());
    }

    info!("Score completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Validate score arguments
///
/// **Public** - can be called before execute_score for early validation
pub fn validate_args(args: &ScoreArgs) -> Result<()> {
    validate_estimator_config(&args.config)?;

    if args.profile.as_os_str().is_empty() {
        anyhow::bail!("Profile path cannot be empty");
    }

    if let Some(path) = &args.output_json {
        if path.as_os_str().is_empty() {
            anyhow::bail!("JSON output path cannot be empty");
        }
    }

    Ok(())
}
