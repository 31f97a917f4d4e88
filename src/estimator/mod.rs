//! Trace size estimation.
//!
//! This module ties the pieces together:
//! - Classify regions and register the standard events
//! - Ask the event-size oracle for byte costs
//! - Aggregate the profile and build sorted group/region tables
//! - Apply the memory requirement formula

pub mod memory;
pub mod sort;
pub mod tables;

// Re-export main types
pub use memory::{MemoryModel, SizeSummary};
pub use sort::sort_descending_by;
pub use tables::{GroupRow, RegionRow, RowMetrics};

use crate::aggregator::{aggregate, Aggregation};
use crate::events::{standard_catalog, EventCatalog};
use crate::oracle::{calculate_event_sizes, EventSizeOracle};
use crate::profile::{classify_regions, Group, Profile};
use crate::utils::config::EstimatorConfig;
use crate::utils::error::EstimatorError;
use log::{debug, info};

/// Estimated trace sizes of one profile
///
/// **Public** - owns the event catalog and the aggregated tables
#[derive(Debug, Clone)]
pub struct Estimator {
    catalog: EventCatalog,
    aggregation: Aggregation,
    memory: MemoryModel,
}

impl Estimator {
    /// Estimate the trace of a profile
    ///
    /// **Public** - main entry point for estimation
    ///
    /// # Arguments
    /// * `profile` - Source measurements
    /// * `config` - Dense metric count
    /// * `oracle` - Source of event byte costs
    ///
    /// # Errors
    /// * `EstimatorError::Profile` - classification found an inconsistent call tree
    ///
    /// An unreachable or failing oracle is not an error: sizes stay at zero.
    pub fn new(
        profile: &dyn Profile,
        config: &EstimatorConfig,
        oracle: &dyn EventSizeOracle,
    ) -> Result<Self, EstimatorError> {
        info!("Step 1/4: Registering trace events...");
        let mut catalog = standard_catalog(config.dense_metrics);
        debug!("{} events registered", catalog.len());

        info!("Step 2/4: Querying event sizes...");
        calculate_event_sizes(
            &mut catalog,
            profile.region_count() as u64,
            profile.metric_count(),
            oracle,
        );

        Self::with_catalog(profile, catalog)
    }

    /// Estimate with an event catalog whose sizes are already set
    pub fn with_catalog(profile: &dyn Profile, catalog: EventCatalog) -> Result<Self, EstimatorError> {
        info!("Step 3/4: Classifying {} regions...", profile.region_count());
        let groups = classify_regions(profile)?;

        info!(
            "Step 4/4: Aggregating {} regions over {} processes...",
            profile.region_count(),
            profile.process_count()
        );
        let aggregation = aggregate(profile, &groups, &catalog);

        let estimator = Self {
            catalog,
            aggregation,
            memory: MemoryModel::from_profile(profile),
        };

        let sizes = estimator.sizes();
        info!(
            "Estimated trace size {} bytes, max_buf {} bytes",
            sizes.trace_size, sizes.max_buf
        );

        Ok(estimator)
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn memory_model(&self) -> &MemoryModel {
        &self.memory
    }

    /// Time of the ALL group, in seconds
    pub fn total_time(&self) -> f64 {
        self.aggregation.all().total_time()
    }

    /// Unfiltered size figures
    ///
    /// **Public** - taken from the ALL group
    pub fn sizes(&self) -> SizeSummary {
        let all = self.aggregation.all();
        self.memory
            .summary(all.total_trace_buffer_size(), all.max_trace_buffer_size())
    }

    /// Row of a single group, `None` when the group is absent
    pub fn group_row(&self, group: Group) -> Option<GroupRow> {
        RowMetrics::from_accumulator(self.aggregation.group(group), self.total_time())
            .map(|metrics| GroupRow::new(group, metrics))
    }

    /// Present groups sorted by `max_buf`, largest first
    ///
    /// **Public** - ALL is always the first row of a non-empty table
    pub fn group_table(&self) -> Vec<GroupRow> {
        let mut rows: Vec<GroupRow> = Group::ALL
            .iter()
            .filter_map(|group| self.group_row(*group))
            .collect();
        sort_descending_by(&mut rows, |row| row.metrics.max_buf);
        rows
    }

    /// Present regions sorted by `max_buf`, largest first
    ///
    /// **Public** - the row index is the region key of the filter engine
    pub fn region_table(&self) -> Vec<RegionRow> {
        let total_time = self.total_time();
        let mut rows: Vec<RegionRow> = self
            .aggregation
            .regions
            .iter()
            .filter_map(|region| RegionRow::from_aggregate(region, total_time))
            .collect();
        sort_descending_by(&mut rows, |row| row.metrics.max_buf);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use crate::profile::{CallNode, JsonProfile, ProcessDefinition, ProfileDocument, RegionDefinition};
    use crate::utils::error::ProfileError;

    const MIB: u64 = 1024 * 1024;

    fn oracle() -> StaticOracle {
        StaticOracle::new()
            .with_size("Enter", 12)
            .with_size("Leave", 12)
            .with_size("Timestamp", 8)
            .with_size("MpiSend", 30)
    }

    fn document() -> ProfileDocument {
        ProfileDocument {
            regions: vec![
                RegionDefinition::new("main"),
                RegionDefinition::new("MPI_Send"),
                RegionDefinition::new("compute"),
                RegionDefinition::new("unused"),
            ],
            processes: vec![ProcessDefinition::with_locations(2), ProcessDefinition::with_locations(1)],
            metrics: vec!["time".into(), "visits".into()],
            visits: vec![vec![1, 1], vec![10, 20], vec![128, 0], vec![0, 0]],
            time: vec![vec![0.5, 0.5], vec![1.0, 2.0], vec![4.0, 0.0], vec![0.0, 0.0]],
            call_tree: vec![CallNode {
                region: 0,
                children: vec![CallNode {
                    region: 1,
                    children: vec![],
                }],
            }],
        }
    }

    fn estimator() -> Estimator {
        let profile = JsonProfile::from_document(document(), 4000).unwrap();
        Estimator::new(&profile, &EstimatorConfig::default(), &oracle()).unwrap()
    }

    #[test]
    fn test_sizes() {
        let est = estimator();
        // main 40/visit, MPI_Send 70/visit, compute 40/visit
        // process 0: 40 + 700 + 5120, process 1: 40 + 1400
        let sizes = est.sizes();
        assert_eq!(sizes.trace_size, 7300);
        assert_eq!(sizes.max_buf, 5860);
        assert_eq!(sizes.total_memory, 2 * MIB + 2 * 2 * MIB);
    }

    #[test]
    fn test_group_table_sorted_and_present_only() {
        let table = estimator().group_table();
        let groups: Vec<Group> = table.iter().map(|r| r.group).collect();

        assert_eq!(groups, vec![Group::All, Group::Usr, Group::Mpi, Group::Com]);
        assert_eq!(table[0].metrics.time_percent, 100.0);
        assert!(table.windows(2).all(|w| w[0].metrics.max_buf >= w[1].metrics.max_buf));
    }

    #[test]
    fn test_region_table() {
        let table = estimator().region_table();
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["compute", "MPI_Send", "main"]);
        assert_eq!(table[1].group, Group::Mpi);
        assert_eq!(table[1].per_process, vec![700, 1400]);
        assert_eq!(table[2].group, Group::Com);
        assert_eq!(table[0].metrics.time_per_visit, 31_250.0);
    }

    #[test]
    fn test_failing_oracle_gives_zero_sizes() {
        let profile = JsonProfile::from_document(document(), 0).unwrap();
        let est = Estimator::new(&profile, &EstimatorConfig::default(), &StaticOracle::new()).unwrap();

        assert_eq!(est.sizes().trace_size, 0);
        assert!(est.group_table().is_empty());
        assert!(est.region_table().is_empty());
    }

    #[test]
    fn test_bad_call_tree_is_an_error() {
        let mut doc = document();
        doc.call_tree = vec![CallNode {
            region: 42,
            children: vec![],
        }];
        let profile = JsonProfile::from_document(doc, 0).unwrap();

        let result = Estimator::new(&profile, &EstimatorConfig::default(), &oracle());
        assert!(matches!(
            result,
            Err(EstimatorError::Profile(ProfileError::UnknownCallTreeRegion { .. }))
        ));
    }
}
