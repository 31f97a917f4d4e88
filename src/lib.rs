//! Trace Score
//!
//! Trace buffer size estimation and region filtering for
//! instrumented parallel programs.
//!
//! The estimator turns a flat profile plus the byte cost of every trace
//! event into per-group and per-region buffer requirements. The filter
//! engine tracks which regions are excluded from tracing and recomputes
//! the sizes after every change.
//!
//! ## Getting Started
//!
//! ```bash
//! trace-score score profile.json --regions
//! trace-score filter profile.json --exclude-group USR
//! ```
//!
//! ```ignore
//! let profile = JsonProfile::load("profile.json")?;
//! let oracle = SubprocessOracle::new("otf2-estimator");
//! let estimator = Estimator::new(&profile, &EstimatorConfig::default(), &oracle)?;
//!
//! let mut engine = FilterStateEngine::new(&estimator);
//! engine.select_all_filterable()?;
//! engine.write_filter_file("profile.filter")?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod estimator;
pub mod events;
pub mod filter;
pub mod oracle;
pub mod output;
pub mod profile;
pub mod utils;
