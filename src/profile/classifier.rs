//! Region classification by name prefix and call-tree position.

use super::group::Group;
use super::schema::CallNode;
use crate::utils::error::ProfileError;
use log::debug;

/// Name prefixes checked in order, first match wins
const PREFIX_RULES: &[(&str, Group)] = &[
    ("MPI_", Group::Mpi),
    ("shmem_", Group::Shmem),
    ("!$omp ", Group::Omp),
    ("pthread_", Group::Pthread),
];

/// Classify a region by its display name
///
/// **Public** - first pass of the classification
pub fn classify(region_name: &str) -> Group {
    PREFIX_RULES
        .iter()
        .find(|(prefix, _)| region_name.starts_with(prefix))
        .map(|(_, group)| *group)
        .unwrap_or(Group::Usr)
}

/// Reclassify USR regions that call into a communication library as COM
///
/// **Public** - second pass, run once over every call-tree root
///
/// # Arguments
/// * `roots` - Call-tree roots
/// * `groups` - Per-region groups from `classify`, updated in place
///
/// # Errors
/// * `ProfileError::UnknownCallTreeRegion` - a node points past `groups`
pub fn propagate(roots: &[CallNode], groups: &mut [Group]) -> Result<(), ProfileError> {
    for root in roots {
        propagate_node(root, groups)?;
    }

    let com = groups.iter().filter(|g| **g == Group::Com).count();
    debug!("Call-tree pass marked {} regions as COM", com);

    Ok(())
}

/// Post-order visit; returns whether `node` or a descendant is MPI/OMP/SHMEM
fn propagate_node(node: &CallNode, groups: &mut [Group]) -> Result<bool, ProfileError> {
    let mut is_on_path = false;
    // Every child must be visited, so no short-circuit here
    for child in &node.children {
        if propagate_node(child, groups)? {
            is_on_path = true;
        }
    }

    let count = groups.len();
    let group = groups
        .get_mut(node.region)
        .ok_or(ProfileError::UnknownCallTreeRegion {
            region: node.region,
            count,
        })?;

    if is_on_path && *group == Group::Usr {
        *group = Group::Com;
    }

    Ok(is_on_path || group.is_communication())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(region: usize, children: Vec<CallNode>) -> CallNode {
        CallNode { region, children }
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("MPI_Send"), Group::Mpi);
        assert_eq!(classify("shmem_barrier_all"), Group::Shmem);
        assert_eq!(classify("!$omp parallel @foo.c:12"), Group::Omp);
        assert_eq!(classify("pthread_create"), Group::Pthread);
        assert_eq!(classify("main"), Group::Usr);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("mpi_send"), Group::Usr);
        assert_eq!(classify("!$omp"), Group::Usr);
    }

    #[test]
    fn test_propagate_marks_callers() {
        // main -> solve -> MPI_Allreduce, main -> print
        let mut groups = vec![Group::Usr, Group::Usr, Group::Mpi, Group::Usr];
        let roots = vec![node(0, vec![node(1, vec![node(2, vec![])]), node(3, vec![])])];

        propagate(&roots, &mut groups).unwrap();

        assert_eq!(groups, vec![Group::Com, Group::Com, Group::Mpi, Group::Usr]);
    }

    #[test]
    fn test_propagate_leaves_pthread_callers() {
        let mut groups = vec![Group::Usr, Group::Pthread];
        let roots = vec![node(0, vec![node(1, vec![])])];

        propagate(&roots, &mut groups).unwrap();

        assert_eq!(groups, vec![Group::Usr, Group::Pthread]);
    }

    #[test]
    fn test_propagate_visits_all_children() {
        // first child reaches OMP; second child subtree must still be processed
        let mut groups = vec![Group::Usr, Group::Omp, Group::Usr, Group::Shmem];
        let roots = vec![node(0, vec![node(1, vec![]), node(2, vec![node(3, vec![])])])];

        propagate(&roots, &mut groups).unwrap();

        assert_eq!(groups[2], Group::Com);
        assert_eq!(groups[0], Group::Com);
    }

    #[test]
    fn test_propagate_unknown_region() {
        let mut groups = vec![Group::Usr];
        let roots = vec![node(0, vec![node(5, vec![])])];

        let result = propagate(&roots, &mut groups);
        assert!(matches!(
            result,
            Err(ProfileError::UnknownCallTreeRegion { region: 5, count: 1 })
        ));
    }
}
