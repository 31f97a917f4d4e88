//! Tri-state inclusion model over the group and region tables.

use crate::estimator::memory::{MemoryModel, SizeSummary};
use crate::estimator::sort::sort_descending_by;
use crate::estimator::tables::{time_per_visit, time_percent, GroupRow, RegionRow, RowMetrics};
use crate::estimator::Estimator;
use crate::profile::Group;
use crate::utils::error::FilterError;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// Inclusion state of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriState {
    Included,
    Excluded,
    /// Some regions included, some excluded
    Partial,
}

impl TriState {
    /// State of a set of regions from their `included` flags
    pub fn derive(included: impl IntoIterator<Item = bool>) -> Self {
        let mut any_included = false;
        let mut any_excluded = false;
        for flag in included {
            if flag {
                any_included = true;
            } else {
                any_excluded = true;
            }
        }

        match (any_included, any_excluded) {
            (_, false) => TriState::Included,
            (false, true) => TriState::Excluded,
            (true, true) => TriState::Partial,
        }
    }

    /// State after a toggle; PARTIAL counts as includable
    fn flipped(self) -> Self {
        match self {
            TriState::Included | TriState::Partial => TriState::Excluded,
            TriState::Excluded => TriState::Included,
        }
    }
}

/// Which table a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Groups,
    Regions,
}

impl TableKind {
    fn name(self) -> &'static str {
        match self {
            TableKind::Groups => "group",
            TableKind::Regions => "region",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    pub row: GroupRow,
    pub state: TriState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionEntry {
    pub row: RegionRow,
    pub included: bool,
}

/// Filter decisions over one estimator's tables
///
/// **Public** - keys are indices into `groups()` and `regions()`
///
/// The group table ends with the synthetic FLT row that sums up the
/// excluded regions.
#[derive(Debug, Clone)]
pub struct FilterStateEngine {
    groups: Vec<GroupEntry>,
    regions: Vec<RegionEntry>,
    excluded: BTreeSet<usize>,
    memory: MemoryModel,
    processes: usize,
    total_time: f64,
    sizes: SizeSummary,
    filtered_sizes: SizeSummary,
}

impl FilterStateEngine {
    /// Start with every region included
    ///
    /// **Public** - takes the sorted tables of the estimator
    pub fn new(estimator: &Estimator) -> Self {
        let mut groups: Vec<GroupEntry> = estimator
            .group_table()
            .into_iter()
            .filter(|row| row.group != Group::Flt)
            .map(|row| GroupEntry {
                row,
                state: TriState::Included,
            })
            .collect();

        groups.push(GroupEntry {
            row: GroupRow::new(Group::Flt, RowMetrics::default()),
            state: TriState::Excluded,
        });

        let regions = estimator
            .region_table()
            .into_iter()
            .map(|row| RegionEntry { row, included: true })
            .collect();

        let mut engine = Self {
            groups,
            regions,
            excluded: BTreeSet::new(),
            memory: *estimator.memory_model(),
            processes: estimator.memory_model().processes as usize,
            total_time: estimator.total_time(),
            sizes: estimator.sizes(),
            filtered_sizes: estimator.sizes(),
        };
        engine.recalculate();
        engine
    }

    pub fn groups(&self) -> &[GroupEntry] {
        &self.groups
    }

    pub fn regions(&self) -> &[RegionEntry] {
        &self.regions
    }

    /// Excluded region keys in ascending order
    pub fn excluded(&self) -> &BTreeSet<usize> {
        &self.excluded
    }

    pub fn has_filtered(&self) -> bool {
        !self.excluded.is_empty()
    }

    /// Unfiltered size figures
    pub fn sizes(&self) -> SizeSummary {
        self.sizes
    }

    /// Size figures without the excluded regions
    pub fn filtered_sizes(&self) -> SizeSummary {
        self.filtered_sizes
    }

    /// State of a group, `None` when the group has no row
    pub fn group_state(&self, group: Group) -> Option<TriState> {
        self.groups
            .iter()
            .find(|entry| entry.row.group == group)
            .map(|entry| entry.state)
    }

    /// Key of a group row
    pub fn group_key(&self, group: Group) -> Option<usize> {
        self.groups.iter().position(|entry| entry.row.group == group)
    }

    /// Key of the first region row with this display name
    pub fn region_key(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|entry| entry.row.name == name)
    }

    /// Groups over the included regions only, FLT over the excluded ones
    ///
    /// **Public** - sorted like `Estimator::group_table`
    pub fn filtered_group_table(&self) -> Vec<GroupRow> {
        let mut rows: Vec<GroupRow> = Group::ALL
            .iter()
            .filter(|group| **group != Group::Flt)
            .filter_map(|&group| {
                let included = self
                    .included_regions()
                    .filter(|r| group == Group::All || r.group == group);
                let (_, metrics) = sum_rows(included, self.processes, self.total_time);
                metrics.map(|m| GroupRow::new(group, m))
            })
            .collect();

        if let Some(flt) = self.groups.last() {
            if flt.row.metrics.total_buf > 0 {
                rows.push(flt.row.clone());
            }
        }

        sort_descending_by(&mut rows, |row| row.metrics.max_buf);
        rows
    }

    fn included_regions(&self) -> impl Iterator<Item = &RegionRow> {
        self.regions
            .iter()
            .filter(|entry| entry.included)
            .map(|entry| &entry.row)
    }

    /// Flip a group and cascade to its regions
    ///
    /// **Public** - FLT clears or fills the whole filter
    ///
    /// # Errors
    /// * `FilterError::OutOfRange` - no group row with this key
    /// * `FilterError::NotFilterable` - ALL, MPI, OMP, SHMEM and PTHREAD
    pub fn toggle_group(&mut self, key: usize) -> Result<(), FilterError> {
        let result = self.apply_group_toggle(key);
        self.recalculate();
        result
    }

    /// Flip one region and re-derive its group
    ///
    /// # Errors
    /// * `FilterError::OutOfRange` - no region row with this key
    /// * `FilterError::NotFilterable` - the region belongs to a non-filterable group
    pub fn toggle_region(&mut self, key: usize) -> Result<(), FilterError> {
        let result = self.apply_region_toggle(key);
        self.recalculate();
        result
    }

    /// Toggle several keys of one table
    ///
    /// **Public** - successful toggles stay applied when others fail
    ///
    /// # Errors
    /// * `FilterError::Batch` - at least one toggle failed
    pub fn toggle_many(&mut self, keys: &[usize], table: TableKind) -> Result<(), FilterError> {
        let mut failed = 0;
        for &key in keys {
            let result = match table {
                TableKind::Groups => self.apply_group_toggle(key),
                TableKind::Regions => self.apply_region_toggle(key),
            };
            if let Err(e) = result {
                warn!("Skipping {} {}: {}", table.name(), key, e);
                failed += 1;
            }
        }
        self.recalculate();

        if failed > 0 {
            return Err(FilterError::Batch {
                failed,
                total: keys.len(),
            });
        }
        Ok(())
    }

    /// Toggle the FLT row
    ///
    /// **Public** - the "select all" action
    ///
    /// FLT flips like any group: when nothing is excluded the call excludes
    /// every filterable region; when FLT is INCLUDED or PARTIAL it becomes
    /// EXCLUDED and every region is included again. Use
    /// `exclude_all_filterable_regions` when the result must not depend on
    /// the current state.
    pub fn select_all_filterable(&mut self) -> Result<(), FilterError> {
        let key = self.groups.len() - 1;
        self.toggle_group(key)
    }

    /// Exclude every region of a filterable group
    ///
    /// Repeated calls leave the filter unchanged.
    pub fn exclude_all_filterable_regions(&mut self) {
        self.exclude_all_filterable();
        self.recalculate();
    }

    fn apply_group_toggle(&mut self, key: usize) -> Result<(), FilterError> {
        let entry = self.groups.get(key).ok_or(FilterError::OutOfRange {
            table: TableKind::Groups.name(),
            index: key,
        })?;
        let group = entry.row.group;
        if !group.is_filterable() {
            return Err(FilterError::NotFilterable(group.name().to_string()));
        }

        let new_state = entry.state.flipped();
        debug!("Group {} -> {:?}", group, new_state);

        if group == Group::Flt {
            match new_state {
                TriState::Excluded => self.include_all(),
                _ => self.exclude_all_filterable(),
            }
            return Ok(());
        }

        let exclude = new_state == TriState::Excluded;
        for (index, region) in self.regions.iter_mut().enumerate() {
            if region.row.group == group && region.included == exclude {
                region.included = !exclude;
                if exclude {
                    self.excluded.insert(index);
                } else {
                    self.excluded.remove(&index);
                }
            }
        }
        self.groups[key].state = new_state;
        Ok(())
    }

    fn apply_region_toggle(&mut self, key: usize) -> Result<(), FilterError> {
        let region = self.regions.get_mut(key).ok_or(FilterError::OutOfRange {
            table: TableKind::Regions.name(),
            index: key,
        })?;
        let group = region.row.group;
        if !group.is_filterable() {
            return Err(FilterError::NotFilterable(region.row.name.clone()));
        }

        region.included = !region.included;
        if region.included {
            self.excluded.remove(&key);
        } else {
            self.excluded.insert(key);
        }

        let state = TriState::derive(
            self.regions
                .iter()
                .filter(|r| r.row.group == group)
                .map(|r| r.included),
        );
        if let Some(entry) = self.groups.iter_mut().find(|g| g.row.group == group) {
            entry.state = state;
        }
        Ok(())
    }

    fn include_all(&mut self) {
        self.excluded.clear();
        for region in &mut self.regions {
            region.included = true;
        }
        for entry in filterable_groups(&mut self.groups) {
            entry.state = TriState::Included;
        }
    }

    fn exclude_all_filterable(&mut self) {
        for (index, region) in self.regions.iter_mut().enumerate() {
            if region.included && region.row.group.is_filterable() {
                region.included = false;
                self.excluded.insert(index);
            }
        }
        for entry in filterable_groups(&mut self.groups) {
            entry.state = TriState::Excluded;
        }
    }

    /// Refresh the FLT row and the filtered sizes from the excluded set
    fn recalculate(&mut self) {
        let mut metrics = RowMetrics::default();
        for &index in &self.excluded {
            let row = &self.regions[index].row.metrics;
            metrics.max_buf = metrics.max_buf.saturating_add(row.max_buf);
            metrics.total_buf = metrics.total_buf.saturating_add(row.total_buf);
            metrics.visits += row.visits;
            metrics.time_s += row.time_s;
            metrics.time_percent += row.time_percent;
        }
        metrics.time_per_visit = time_per_visit(metrics.time_s, metrics.visits);

        let flt_state = if self.excluded.is_empty() {
            TriState::Excluded
        } else if self
            .groups
            .iter()
            .filter(|g| g.row.group != Group::Flt && g.row.group.is_filterable())
            .all(|g| g.state == TriState::Excluded)
        {
            TriState::Included
        } else {
            TriState::Partial
        };

        if let Some(flt) = self.groups.last_mut() {
            flt.row.metrics = metrics;
            flt.state = flt_state;
        }

        let (per_process, _) = sum_rows(self.included_regions(), self.processes, self.total_time);
        let trace_size = per_process.iter().fold(0u64, |acc, b| acc.saturating_add(*b));
        let max_buf = per_process.iter().copied().max().unwrap_or(0);

        self.filtered_sizes = self.memory.summary(trace_size, max_buf);
        debug!(
            "Filtered {} regions: trace size {} bytes, max_buf {} bytes",
            self.excluded.len(),
            trace_size,
            max_buf
        );
    }
}

/// Per-process bytes and metrics over a set of region rows
///
/// Metrics are `None` when the rows hold no buffer bytes.
fn sum_rows<'a>(
    rows: impl Iterator<Item = &'a RegionRow>,
    processes: usize,
    total_time: f64,
) -> (Vec<u64>, Option<RowMetrics>) {
    let mut per_process = vec![0u64; processes];
    let mut metrics = RowMetrics::default();

    for row in rows {
        for (total, bytes) in per_process.iter_mut().zip(&row.per_process) {
            *total = total.saturating_add(*bytes);
        }
        metrics.total_buf = metrics.total_buf.saturating_add(row.metrics.total_buf);
        metrics.visits += row.metrics.visits;
        metrics.time_s += row.metrics.time_s;
    }

    if metrics.total_buf == 0 {
        return (per_process, None);
    }

    metrics.max_buf = per_process.iter().copied().max().unwrap_or(0);
    metrics.time_percent = time_percent(metrics.time_s, total_time);
    metrics.time_per_visit = time_per_visit(metrics.time_s, metrics.visits);
    (per_process, Some(metrics))
}

/// Filterable group rows other than FLT
fn filterable_groups(groups: &mut [GroupEntry]) -> impl Iterator<Item = &mut GroupEntry> {
    groups
        .iter_mut()
        .filter(|g| g.row.group != Group::Flt && g.row.group.is_filterable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use crate::profile::{JsonProfile, ProcessDefinition, ProfileDocument, RegionDefinition};
    use crate::utils::config::EstimatorConfig;

    fn estimator(names: &[&str], visits: Vec<Vec<u64>>) -> Estimator {
        let processes = visits.first().map(|v| v.len()).unwrap_or(0);
        let time = visits
            .iter()
            .map(|row| row.iter().map(|v| *v as f64).collect())
            .collect();
        let doc = ProfileDocument {
            regions: names.iter().map(|n| RegionDefinition::new(*n)).collect(),
            processes: vec![ProcessDefinition::with_locations(1); processes],
            metrics: vec!["time".into()],
            visits,
            time,
            call_tree: vec![],
        };
        let profile = JsonProfile::from_document(doc, 0).unwrap();
        let oracle = StaticOracle::new().with_size("Enter", 10).with_size("Leave", 10);
        Estimator::new(&profile, &EstimatorConfig::default(), &oracle).unwrap()
    }

    fn engine() -> FilterStateEngine {
        // a: 300, b: 200, c: 100 bytes on the single process
        FilterStateEngine::new(&estimator(
            &["a", "MPI_Recv", "b", "c"],
            vec![vec![15], vec![1], vec![10], vec![5]],
        ))
    }

    fn key(engine: &FilterStateEngine, group: Group) -> usize {
        engine.group_key(group).unwrap()
    }

    #[test]
    fn test_tristate_derive() {
        assert_eq!(TriState::derive([true, true]), TriState::Included);
        assert_eq!(TriState::derive([false, false]), TriState::Excluded);
        assert_eq!(TriState::derive([true, false]), TriState::Partial);
        assert_eq!(TriState::derive(std::iter::empty()), TriState::Included);
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        assert_eq!(engine.groups().last().unwrap().row.group, Group::Flt);
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Excluded));
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Included));
        assert!(!engine.has_filtered());
        assert_eq!(engine.filtered_sizes(), engine.sizes());
        assert!(engine.regions().iter().all(|r| r.included));
    }

    #[test]
    fn test_region_toggle_updates_group_and_sizes() {
        let mut engine = engine();
        let c = engine.region_key("c").unwrap();

        engine.toggle_region(c).unwrap();

        assert!(!engine.regions()[c].included);
        assert!(engine.excluded().contains(&c));
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Partial));
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Partial));
        assert_eq!(engine.filtered_sizes().trace_size, engine.sizes().trace_size - 100);

        let flt = &engine.groups().last().unwrap().row.metrics;
        assert_eq!(flt.max_buf, 100);
        assert_eq!(flt.visits, 5);
    }

    #[test]
    fn test_region_toggle_is_involution() {
        let mut engine = engine();
        let b = engine.region_key("b").unwrap();
        let before = (engine.filtered_sizes(), engine.group_state(Group::Usr));

        engine.toggle_region(b).unwrap();
        engine.toggle_region(b).unwrap();

        assert_eq!((engine.filtered_sizes(), engine.group_state(Group::Usr)), before);
        assert!(!engine.has_filtered());
    }

    #[test]
    fn test_non_filterable_region() {
        let mut engine = engine();
        let mpi = engine.region_key("MPI_Recv").unwrap();

        let result = engine.toggle_region(mpi);

        assert_eq!(result, Err(FilterError::NotFilterable("MPI_Recv".to_string())));
        assert!(engine.regions()[mpi].included);
        assert!(!engine.has_filtered());
    }

    #[test]
    fn test_non_filterable_groups() {
        let mut engine = engine();
        for group in [Group::All, Group::Mpi] {
            let k = key(&engine, group);
            assert!(matches!(engine.toggle_group(k), Err(FilterError::NotFilterable(_))));
        }
        assert!(!engine.has_filtered());
    }

    #[test]
    fn test_out_of_range() {
        let mut engine = engine();
        assert_eq!(
            engine.toggle_region(99),
            Err(FilterError::OutOfRange {
                table: "region",
                index: 99
            })
        );
        assert!(matches!(engine.toggle_group(99), Err(FilterError::OutOfRange { .. })));
    }

    #[test]
    fn test_group_toggle_cascades() {
        let mut engine = engine();
        let usr = key(&engine, Group::Usr);

        engine.toggle_group(usr).unwrap();

        assert_eq!(engine.excluded().len(), 3);
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Excluded));
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Included));
        assert_eq!(engine.filtered_sizes().trace_size, 20);

        engine.toggle_group(usr).unwrap();
        assert!(!engine.has_filtered());
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Included));
    }

    #[test]
    fn test_partial_group_flips_to_excluded() {
        let mut engine = engine();
        let a = engine.region_key("a").unwrap();
        engine.toggle_region(a).unwrap();
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Partial));

        let usr = key(&engine, Group::Usr);
        engine.toggle_group(usr).unwrap();

        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Excluded));
        assert_eq!(engine.excluded().len(), 3);
    }

    #[test]
    fn test_flt_toggle_fills_and_clears() {
        let mut engine = engine();

        engine.select_all_filterable().unwrap();
        assert_eq!(engine.excluded().len(), 3);
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Included));
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Excluded));

        engine.select_all_filterable().unwrap();
        assert!(!engine.has_filtered());
        assert!(engine.regions().iter().all(|r| r.included));
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Excluded));
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Included));
    }

    #[test]
    fn test_toggle_many_keeps_successes() {
        let mut engine = engine();
        let a = engine.region_key("a").unwrap();
        let mpi = engine.region_key("MPI_Recv").unwrap();

        let result = engine.toggle_many(&[a, mpi], TableKind::Regions);

        assert_eq!(result, Err(FilterError::Batch { failed: 1, total: 2 }));
        assert_eq!(engine.excluded().iter().copied().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_filtered_group_table() {
        let mut engine = engine();
        let a = engine.region_key("a").unwrap();
        engine.toggle_region(a).unwrap();

        let table = engine.filtered_group_table();
        let summary: Vec<(Group, u64)> = table.iter().map(|r| (r.group, r.metrics.max_buf)).collect();

        assert_eq!(
            summary,
            vec![(Group::All, 320), (Group::Usr, 300), (Group::Flt, 300), (Group::Mpi, 20)]
        );
    }

    #[test]
    fn test_included_matches_excluded_set() {
        let mut engine = engine();
        let b = engine.region_key("b").unwrap();
        engine.toggle_region(b).unwrap();
        engine.select_all_filterable().unwrap();
        engine.toggle_region(b).unwrap();

        for (index, region) in engine.regions().iter().enumerate() {
            assert_eq!(!region.included, engine.excluded().contains(&index));
        }
    }

    #[test]
    fn test_exclude_all_filterable_regions_is_idempotent() {
        let mut engine = engine();
        let a = engine.region_key("a").unwrap();
        engine.toggle_region(a).unwrap();
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Partial));

        engine.exclude_all_filterable_regions();
        engine.exclude_all_filterable_regions();

        assert_eq!(engine.excluded().len(), 3);
        assert_eq!(engine.group_state(Group::Usr), Some(TriState::Excluded));
        assert_eq!(engine.group_state(Group::Flt), Some(TriState::Included));
        assert_eq!(engine.filtered_sizes().trace_size, 20);
    }
}
