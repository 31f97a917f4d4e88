//! Helpers shared by the commands.

use crate::estimator::Estimator;
use crate::oracle::SubprocessOracle;
use crate::profile::JsonProfile;
use crate::utils::config::{EstimatorConfig, MAX_DENSE_METRICS, SCHEMA_VERSION};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Load a profile and estimate its trace
pub fn load_estimator(profile_path: &Path, config: &EstimatorConfig) -> Result<Estimator> {
    let profile = JsonProfile::load(profile_path)
        .with_context(|| format!("Failed to load profile {}", profile_path.display()))?;

    let oracle = SubprocessOracle::new(config.estimator_command.as_str());
    info!("Using event-size estimator: {}", oracle.command());

    Estimator::new(&profile, config, &oracle).context("Failed to estimate trace size")
}

/// Checks shared by every command that runs the estimator
pub fn validate_estimator_config(config: &EstimatorConfig) -> Result<()> {
    if config.dense_metrics > MAX_DENSE_METRICS {
        anyhow::bail!(
            "dense_metrics is too large (max {}, got {})",
            MAX_DENSE_METRICS,
            config.dense_metrics
        );
    }

    if config.estimator_command.trim().is_empty() {
        anyhow::bail!("Estimator command cannot be empty");
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("trace-score v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Trace buffer size estimation and region filtering for Score-P profiles.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_estimator_config(&EstimatorConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_too_many_metrics() {
        let config = EstimatorConfig::default().with_dense_metrics(MAX_DENSE_METRICS + 1);
        assert!(validate_estimator_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_command() {
        let config = EstimatorConfig::default().with_estimator_command("  ");
        assert!(validate_estimator_config(&config).is_err());
    }

    #[test]
    fn test_load_missing_profile() {
        let result = load_estimator(Path::new("/nonexistent/profile.json"), &EstimatorConfig::default());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to load profile"));
    }
}
