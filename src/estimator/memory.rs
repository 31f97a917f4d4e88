//! Memory requirement model.

use crate::profile::Profile;
use crate::utils::config::MEMORY_UNIT_BYTES;
use serde::{Deserialize, Serialize};

/// Trace size figures for one filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeSummary {
    /// Bytes summed over all processes
    pub trace_size: u64,

    /// Largest single-process buffer
    pub max_buf: u64,

    /// Recommended `SCOREP_TOTAL_MEMORY`
    pub total_memory: u64,
}

/// Profile figures the memory formula depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryModel {
    pub file_size: u64,
    pub processes: u64,
    pub metrics: u64,
    pub max_locations: u64,
}

impl MemoryModel {
    pub fn from_profile(profile: &dyn Profile) -> Self {
        Self {
            file_size: profile.file_size(),
            processes: profile.process_count() as u64,
            metrics: profile.metric_count(),
            max_locations: profile.max_locations_per_process(),
        }
    }

    /// Definitions size estimated from the profile size
    pub fn definition_estimate(&self) -> u64 {
        let denominator = self.processes.saturating_mul(self.metrics);
        if denominator == 0 {
            0
        } else {
            self.file_size / denominator
        }
    }

    /// Recommended total memory for a given largest buffer
    ///
    /// `max(2 MiB, max_buf + definitions) + 2 MiB per location`
    pub fn total_memory(&self, max_buf: u64) -> u64 {
        let buffers = max_buf.saturating_add(self.definition_estimate());
        buffers
            .max(MEMORY_UNIT_BYTES)
            .saturating_add(MEMORY_UNIT_BYTES.saturating_mul(self.max_locations))
    }

    pub fn summary(&self, trace_size: u64, max_buf: u64) -> SizeSummary {
        SizeSummary {
            trace_size,
            max_buf,
            total_memory: self.total_memory(max_buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn model(file_size: u64, processes: u64, metrics: u64, max_locations: u64) -> MemoryModel {
        MemoryModel {
            file_size,
            processes,
            metrics,
            max_locations,
        }
    }

    #[test]
    fn test_small_buffers_use_minimum() {
        let m = model(1000, 2, 2, 1);
        assert_eq!(m.definition_estimate(), 250);
        assert_eq!(m.total_memory(480), 2 * MIB + 2 * MIB);
    }

    #[test]
    fn test_large_buffer() {
        let m = model(4 * MIB, 2, 2, 4);
        assert_eq!(m.total_memory(10 * MIB), 11 * MIB + 8 * MIB);
    }

    #[test]
    fn test_zero_denominator() {
        let m = model(4 * MIB, 0, 2, 1);
        assert_eq!(m.definition_estimate(), 0);
        assert_eq!(m.total_memory(3 * MIB), 5 * MIB);
    }

    #[test]
    fn test_summary() {
        let s = model(0, 1, 1, 1).summary(900, 450);
        assert_eq!(
            s,
            SizeSummary {
                trace_size: 900,
                max_buf: 450,
                total_memory: 4 * MIB
            }
        );
    }

    #[test]
    fn test_saturates() {
        let m = model(0, 1, 1, u64::MAX);
        assert_eq!(m.total_memory(u64::MAX), u64::MAX);
    }
}
