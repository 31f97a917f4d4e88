//! Region groups and their filter policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse category of a region
///
/// **Public** - the declaration order is the group table order before sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Group {
    /// Every region
    All,
    /// Regions excluded by the current filter
    Flt,
    /// User code that never reaches a communication library
    Usr,
    /// User code on a call path into MPI, OpenMP or SHMEM
    Com,
    Mpi,
    Omp,
    Shmem,
    Pthread,
}

impl Group {
    /// All groups in table order
    pub const ALL: [Group; 8] = [
        Group::All,
        Group::Flt,
        Group::Usr,
        Group::Com,
        Group::Mpi,
        Group::Omp,
        Group::Shmem,
        Group::Pthread,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this group in accumulator arrays
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Group::All => "ALL",
            Group::Flt => "FLT",
            Group::Usr => "USR",
            Group::Com => "COM",
            Group::Mpi => "MPI",
            Group::Omp => "OMP",
            Group::Shmem => "SHMEM",
            Group::Pthread => "PTHREAD",
        }
    }

    /// Whether the user may toggle this group or its regions
    ///
    /// ALL, MPI, OMP, SHMEM and PTHREAD are a fixed deny list.
    pub fn is_filterable(self) -> bool {
        !matches!(
            self,
            Group::All | Group::Mpi | Group::Omp | Group::Shmem | Group::Pthread
        )
    }

    /// Whether a call path through this group makes its USR callers COM
    pub fn is_communication(self) -> bool {
        matches!(self, Group::Mpi | Group::Omp | Group::Shmem)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown group '{}'", s))
    }
}
