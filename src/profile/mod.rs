//! Profile access and region classification.
//!
//! This module handles:
//! - Reading flat profiles from JSON
//! - The `Profile` trait the estimator works against
//! - Grouping regions (USR, COM, MPI, ...)

pub mod classifier;
pub mod group;
pub mod provider;
pub mod schema;

// Re-export main types
pub use classifier::{classify, propagate};
pub use group::Group;
pub use provider::{JsonProfile, Profile};
pub use schema::{CallNode, ProcessDefinition, ProfileDocument, RegionDefinition};

use crate::utils::error::ProfileError;

/// Classify every region of a profile
///
/// **Public** - name prefixes first, then the call-tree pass
pub fn classify_regions(profile: &dyn Profile) -> Result<Vec<Group>, ProfileError> {
    let mut groups: Vec<Group> = (0..profile.region_count())
        .map(|region| classify(profile.region_name(region)))
        .collect();

    propagate(profile.call_tree(), &mut groups)?;

    Ok(groups)
}
