//! Accumulate profile measurements into groups and regions.

use super::accumulator::Accumulator;
use crate::events::EventCatalog;
use crate::profile::{Group, Profile};
use log::debug;

/// Accumulated data of one profile region
#[derive(Debug, Clone)]
pub struct RegionAggregate {
    pub name: String,
    pub mangled_name: String,
    pub group: Group,
    /// Trace bytes written per visit of this region
    pub bytes_per_visit: u64,
    pub totals: Accumulator,
}

/// Result of one aggregation pass
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Indexed by `Group::index`
    pub groups: Vec<Accumulator>,

    /// Indexed by profile region
    pub regions: Vec<RegionAggregate>,
}

impl Aggregation {
    pub fn group(&self, group: Group) -> &Accumulator {
        &self.groups[group.index()]
    }

    pub fn all(&self) -> &Accumulator {
        self.group(Group::All)
    }
}

/// Accumulate every region of the profile
///
/// **Public** - main entry point for aggregation
///
/// # Arguments
/// * `profile` - Source measurements
/// * `groups` - Group of every region, from `classify_regions`
/// * `catalog` - Events with their sizes already set
///
/// # Panics
/// If `groups` is shorter than the profile's region count
pub fn aggregate(profile: &dyn Profile, groups: &[Group], catalog: &EventCatalog) -> Aggregation {
    let processes = profile.process_count();
    let mut group_totals = vec![Accumulator::new(processes); Group::COUNT];
    let mut regions = Vec::with_capacity(profile.region_count());

    for region in 0..profile.region_count() {
        let name = profile.region_name(region);
        let group = groups[region];
        let bytes_per_visit = catalog.bytes_per_visit(name);
        let mut totals = Accumulator::new(processes);

        for process in 0..processes {
            let visits = profile.visits(region, process);
            if visits == 0 {
                continue;
            }
            let time = profile.time(region, process);

            totals.add(visits, bytes_per_visit, time, process);
            group_totals[group.index()].add(visits, bytes_per_visit, time, process);
            group_totals[Group::All.index()].add(visits, bytes_per_visit, time, process);
        }

        regions.push(RegionAggregate {
            name: name.to_string(),
            mangled_name: profile.mangled_name(region).to_string(),
            group,
            bytes_per_visit,
            totals,
        });
    }

    debug!(
        "Aggregated {} regions over {} processes, {} present",
        regions.len(),
        processes,
        regions.iter().filter(|r| r.totals.is_present()).count()
    );

    Aggregation {
        groups: group_totals,
        regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventPredicate};
    use crate::profile::{JsonProfile, ProcessDefinition, ProfileDocument, RegionDefinition};

    fn catalog() -> EventCatalog {
        let mut catalog = EventCatalog::new();
        catalog.register(Event::new("Enter", EventPredicate::AlwaysNonParameter));
        catalog.register(Event::new("MpiSend", EventPredicate::name_set(["MPI_Send"])));
        catalog.set_size("Enter", 10);
        catalog.set_size("MpiSend", 30);
        catalog
    }

    fn profile() -> JsonProfile {
        let doc = ProfileDocument {
            regions: vec![
                RegionDefinition::new("MPI_Send"),
                RegionDefinition::new("foo"),
                RegionDefinition::new("never_called"),
            ],
            processes: vec![ProcessDefinition::with_locations(1), ProcessDefinition::with_locations(1)],
            metrics: vec!["time".into(), "visits".into()],
            visits: vec![vec![10, 2], vec![5, 0], vec![0, 0]],
            time: vec![vec![1.0, 0.5], vec![0.5, 0.0], vec![0.0, 0.0]],
            call_tree: vec![],
        };
        JsonProfile::from_document(doc, 0).unwrap()
    }

    #[test]
    fn test_aggregate_groups_and_regions() {
        let groups = vec![Group::Mpi, Group::Usr, Group::Usr];
        let agg = aggregate(&profile(), &groups, &catalog());

        assert_eq!(agg.regions[0].bytes_per_visit, 40);
        assert_eq!(agg.regions[1].bytes_per_visit, 10);
        assert_eq!(agg.regions[0].totals.per_process(), &[400, 80]);
        assert_eq!(agg.regions[1].totals.per_process(), &[50, 0]);

        assert_eq!(agg.group(Group::Mpi).total_trace_buffer_size(), 480);
        assert_eq!(agg.group(Group::Usr).total_trace_buffer_size(), 50);
        assert_eq!(agg.all().per_process(), &[450, 80]);
        assert_eq!(agg.all().visits(), 17);
        assert_eq!(agg.all().total_time(), 2.0);
    }

    #[test]
    fn test_unvisited_region_is_absent() {
        let groups = vec![Group::Mpi, Group::Usr, Group::Usr];
        let agg = aggregate(&profile(), &groups, &catalog());

        assert!(!agg.regions[2].totals.is_present());
        assert!(!agg.group(Group::Omp).is_present());
        assert!(!agg.group(Group::Flt).is_present());
    }
}
