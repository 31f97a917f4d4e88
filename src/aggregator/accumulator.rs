//! Per-process buffer accumulation for one group or region.

use serde::Serialize;

/// Running totals for a group or a region
///
/// **Public** - one per group, one per region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accumulator {
    /// Buffer bytes per process index
    per_process: Vec<u64>,

    /// Buffer bytes summed over all processes
    total_buf: u64,

    visits: u64,

    /// Seconds summed over all processes
    time: f64,
}

impl Accumulator {
    pub fn new(processes: usize) -> Self {
        Self {
            per_process: vec![0; processes],
            total_buf: 0,
            visits: 0,
            time: 0.0,
        }
    }

    /// Add one (region, process) measurement
    ///
    /// # Panics
    /// If `process` is not below the process count given to `new`
    pub fn add(&mut self, visits: u64, bytes_per_visit: u64, time: f64, process: usize) {
        let bytes = visits.saturating_mul(bytes_per_visit);
        self.visits += visits;
        self.total_buf = self.total_buf.saturating_add(bytes);
        self.per_process[process] = self.per_process[process].saturating_add(bytes);
        self.time += time;
    }

    /// Largest single-process buffer
    pub fn max_trace_buffer_size(&self) -> u64 {
        self.per_process.iter().copied().max().unwrap_or(0)
    }

    /// Buffer bytes across all processes
    pub fn total_trace_buffer_size(&self) -> u64 {
        self.total_buf
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    pub fn total_time(&self) -> f64 {
        self.time
    }

    pub fn per_process(&self) -> &[u64] {
        &self.per_process
    }

    /// Entities without any buffer bytes are left out of every table
    pub fn is_present(&self) -> bool {
        self.total_buf > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tracks_processes() {
        let mut acc = Accumulator::new(3);
        acc.add(10, 40, 1.0, 0);
        acc.add(5, 40, 0.5, 2);
        acc.add(1, 40, 0.25, 2);

        assert_eq!(acc.per_process(), &[400, 0, 240]);
        assert_eq!(acc.max_trace_buffer_size(), 400);
        assert_eq!(acc.total_trace_buffer_size(), 640);
        assert_eq!(acc.visits(), 16);
        assert_eq!(acc.total_time(), 1.75);
        assert!(acc.is_present());
    }

    #[test]
    fn test_zero_cost_visits_are_absent() {
        let mut acc = Accumulator::new(1);
        acc.add(100, 0, 2.0, 0);
        assert_eq!(acc.visits(), 100);
        assert!(!acc.is_present());
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = Accumulator::new(0);
        assert_eq!(acc.max_trace_buffer_size(), 0);
        assert!(!acc.is_present());
    }
}
