//! Trace Score CLI
//!
//! Estimates the trace buffer requirements of an instrumented program
//! from its profile and writes Score-P filter files.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_score::commands::{
    display_version, events, execute_events, execute_filter, execute_score, filter, score,
    EventsArgs, FilterArgs, ScoreArgs,
};
use trace_score::profile::Group;
use trace_score::utils::config::{EstimatorConfig, DEFAULT_ESTIMATOR_COMMAND, ESTIMATOR_ENV_VAR};

/// Trace Score - trace size estimation for Score-P profiles
#[derive(Parser, Debug)]
#[command(name = "trace-score")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every command that runs the estimator
#[derive(Args, Debug)]
struct EstimatorOptions {
    /// Number of dense metrics recorded with every event
    #[arg(long, default_value = "0")]
    dense_metrics: u64,

    /// Command line of the event-size estimator
    #[arg(long, env = ESTIMATOR_ENV_VAR, default_value = DEFAULT_ESTIMATOR_COMMAND)]
    estimator: String,
}

impl EstimatorOptions {
    fn into_config(self) -> EstimatorConfig {
        EstimatorConfig::new()
            .with_dense_metrics(self.dense_metrics)
            .with_estimator_command(self.estimator)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate the trace size of a profile
    Score {
        /// Path to the JSON profile
        profile: PathBuf,

        /// Print the region table as well
        #[arg(short, long)]
        regions: bool,

        /// Output path for a JSON summary (optional)
        #[arg(long)]
        json: Option<PathBuf>,

        #[command(flatten)]
        estimator: EstimatorOptions,
    },

    /// Exclude regions and write a filter file
    Filter {
        /// Path to the JSON profile
        profile: PathBuf,

        /// Exclude every region of a group (USR, COM)
        #[arg(short = 'g', long = "exclude-group")]
        exclude_groups: Vec<Group>,

        /// Exclude a region by name
        #[arg(short = 'x', long = "exclude-region")]
        exclude_regions: Vec<String>,

        /// Exclude every filterable region
        #[arg(long)]
        exclude_all: bool,

        /// Output path for the filter file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the region table as well
        #[arg(short, long)]
        regions: bool,

        #[command(flatten)]
        estimator: EstimatorOptions,
    },

    /// List the trace events and their sizes
    Events {
        /// Region count passed to the estimator
        #[arg(long, default_value = "1")]
        regions: u64,

        /// Metric count passed to the estimator
        #[arg(long, default_value = "1")]
        metrics: u64,

        #[command(flatten)]
        estimator: EstimatorOptions,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Score {
            profile,
            regions,
            json,
            estimator,
        } => {
            let args = ScoreArgs {
                profile,
                show_regions: regions,
                config: estimator.into_config(),
                output_json: json,
            };

            score::validate_args(&args)?;
            execute_score(args)?;
        }

        Commands::Filter {
            profile,
            exclude_groups,
            exclude_regions,
            exclude_all,
            output,
            regions,
            estimator,
        } => {
            let args = FilterArgs {
                profile,
                exclude_groups,
                exclude_regions,
                exclude_all,
                output,
                show_regions: regions,
                config: estimator.into_config(),
            };

            filter::validate_args(&args)?;
            execute_filter(args)?;
        }

        Commands::Events {
            regions,
            metrics,
            estimator,
        } => {
            let args = EventsArgs {
                regions,
                metrics,
                config: estimator.into_config(),
            };

            events::validate_args(&args)?;
            execute_events(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
