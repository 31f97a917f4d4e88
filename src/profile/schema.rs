//! JSON schema of a flat profile on disk.
//!
//! The document is a dense export of a call-path profile: one row of
//! per-process values for every region, plus the call tree used to
//! classify communication-adjacent user code.

use serde::{Deserialize, Serialize};

/// Top-level profile document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDocument {
    /// Region definitions, indexed by position
    pub regions: Vec<RegionDefinition>,

    /// Processes (location groups), indexed by position
    pub processes: Vec<ProcessDefinition>,

    /// Names of the metrics stored in the profile
    #[serde(default)]
    pub metrics: Vec<String>,

    /// `visits[region][process]`
    #[serde(default)]
    pub visits: Vec<Vec<u64>>,

    /// `time[region][process]` in seconds
    #[serde(default)]
    pub time: Vec<Vec<f64>>,

    /// Roots of the call tree
    #[serde(default)]
    pub call_tree: Vec<CallNode>,
}

/// One instrumented region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDefinition {
    /// Display name
    pub name: String,

    /// Linker-level name, defaults to the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mangled_name: Option<String>,

    /// Source file of the region (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// One process of the measured program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Number of locations (threads) of this process
    #[serde(default = "default_locations")]
    pub locations: u64,
}

fn default_locations() -> u64 {
    1
}

/// A call-tree node referencing a region by index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallNode {
    pub region: usize,

    #[serde(default)]
    pub children: Vec<CallNode>,
}

impl RegionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mangled_name: None,
            file: None,
        }
    }

    pub fn with_mangled_name(mut self, mangled_name: impl Into<String>) -> Self {
        self.mangled_name = Some(mangled_name.into());
        self
    }
}

impl ProcessDefinition {
    pub fn with_locations(locations: u64) -> Self {
        Self {
            name: None,
            locations,
        }
    }
}
