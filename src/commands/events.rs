//! Events command implementation.
//!
//! Lists the standard trace events with the byte costs reported by the
//! event-size estimator.

use super::utils::validate_estimator_config;
use crate::events::{standard_catalog, EventCatalog};
use crate::oracle::{calculate_event_sizes, SubprocessOracle};
use crate::utils::config::EstimatorConfig;
use anyhow::Result;
use log::info;
use std::fmt::Write;

/// Arguments for the events command
#[derive(Debug, Clone)]
pub struct EventsArgs {
    /// Region count sent to the estimator
    pub regions: u64,

    /// Metric count sent to the estimator
    pub metrics: u64,

    pub config: EstimatorConfig,
}

impl Default for EventsArgs {
    fn default() -> Self {
        Self {
            regions: 1,
            metrics: 1,
            config: EstimatorConfig::default(),
        }
    }
}

/// Execute the events command
///
/// **Public** - main entry point called from main.rs
pub fn execute_events(args: EventsArgs) -> Result<()> {
    let mut catalog = standard_catalog(args.config.dense_metrics);
    let oracle = SubprocessOracle::new(args.config.estimator_command.as_str());

    let known = calculate_event_sizes(&mut catalog, args.regions, args.metrics, &oracle);
    info!("{} of {} event sizes known", known, catalog.len());

    print!("{}", render_event_table(&catalog));
    Ok(())
}

/// One line per event: name, stored size, doubling marker
pub fn render_event_table(catalog: &EventCatalog) -> String {
    let width = catalog.names().map(str::len).max().unwrap_or(0).max("event".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$} {:>10}", "event", "bytes", width = width);
    for event in catalog.iter() {
        let marker = if event.is_doubled() { "  (x2)" } else { "" };
        let _ = writeln!(
            out,
            "{:<width$} {:>10}{}",
            event.name(),
            event.size(),
            marker,
            width = width
        );
    }
    out
}

/// Validate events arguments
pub fn validate_args(args: &EventsArgs) -> Result<()> {
    validate_estimator_config(&args.config)?;

    if args.metrics == 0 {
        anyhow::bail!("metrics must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventPredicate};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_event_table() {
        let mut catalog = EventCatalog::new();
        catalog.register(Event::new("Enter", EventPredicate::AlwaysNonParameter));
        catalog.register(Event::new("Timestamp", EventPredicate::AlwaysNonParameter).doubled());
        catalog.set_size("Enter", 12);
        catalog.set_size("Timestamp", 8);

        assert_eq!(
            render_event_table(&catalog),
            "event          bytes\n\
             Enter             12\n\
             Timestamp         16  (x2)\n"
        );
    }

    #[test]
    fn test_validate_zero_metrics() {
        let args = EventsArgs {
            metrics: 0,
            ..EventsArgs::default()
        };
        assert!(validate_args(&args).is_err());
    }
}
