//! Display rows for groups and regions.

use crate::aggregator::{Accumulator, RegionAggregate};
use crate::profile::Group;
use serde::Serialize;

/// Figures shown for every group or region
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RowMetrics {
    pub max_buf: u64,
    pub total_buf: u64,
    pub visits: u64,
    pub time_s: f64,
    pub time_percent: f64,
    /// Microseconds
    pub time_per_visit: f64,
}

impl RowMetrics {
    /// Metrics of a present entity, `None` when it has no buffer bytes
    ///
    /// # Arguments
    /// * `totals` - Accumulated figures of the entity
    /// * `total_time` - Time of the ALL group, base of `time_percent`
    pub fn from_accumulator(totals: &Accumulator, total_time: f64) -> Option<Self> {
        if !totals.is_present() {
            return None;
        }

        Some(Self {
            max_buf: totals.max_trace_buffer_size(),
            total_buf: totals.total_trace_buffer_size(),
            visits: totals.visits(),
            time_s: totals.total_time(),
            time_percent: time_percent(totals.total_time(), total_time),
            time_per_visit: time_per_visit(totals.total_time(), totals.visits()),
        })
    }
}

pub fn time_percent(time: f64, total_time: f64) -> f64 {
    if total_time > 0.0 {
        100.0 * time / total_time
    } else {
        0.0
    }
}

pub fn time_per_visit(time: f64, visits: u64) -> f64 {
    if visits == 0 {
        0.0
    } else {
        time / visits as f64 * 1_000_000.0
    }
}

/// One row of the group table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub group: Group,
    pub name: String,
    pub metrics: RowMetrics,
}

impl GroupRow {
    pub fn new(group: Group, metrics: RowMetrics) -> Self {
        Self {
            group,
            name: group.name().to_string(),
            metrics,
        }
    }
}

/// One row of the region table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub group: Group,
    pub name: String,
    pub mangled_name: String,
    pub bytes_per_visit: u64,
    pub metrics: RowMetrics,

    /// Buffer bytes per process index
    #[serde(skip)]
    pub per_process: Vec<u64>,
}

impl RegionRow {
    pub fn from_aggregate(region: &RegionAggregate, total_time: f64) -> Option<Self> {
        let metrics = RowMetrics::from_accumulator(&region.totals, total_time)?;
        Some(Self {
            group: region.group,
            name: region.name.clone(),
            mangled_name: region.mangled_name.clone(),
            bytes_per_visit: region.bytes_per_visit,
            metrics,
            per_process: region.totals.per_process().to_vec(),
        })
    }
}
