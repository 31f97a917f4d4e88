//! Profiles and oracles shared by the integration tests.

#![allow(dead_code)]

use trace_score::estimator::Estimator;
use trace_score::oracle::StaticOracle;
use trace_score::profile::{CallNode, JsonProfile, ProcessDefinition, ProfileDocument, RegionDefinition};
use trace_score::utils::config::EstimatorConfig;

/// Enter and Leave cost 12 bytes, the doubled timestamp 2 × 8, MpiSend 30
pub fn oracle() -> StaticOracle {
    StaticOracle::new()
        .with_size("Enter", 12)
        .with_size("Leave", 12)
        .with_size("Timestamp", 8)
        .with_size("MpiSend", 30)
}

/// MPI_Send (10 visits, 1.0s) and foo (5 visits, 0.5s) on one process
pub fn two_region_document() -> ProfileDocument {
    ProfileDocument {
        regions: vec![
            RegionDefinition::new("MPI_Send"),
            RegionDefinition::new("foo").with_mangled_name("_Z3foov"),
        ],
        processes: vec![ProcessDefinition::with_locations(1)],
        metrics: vec!["time".into(), "visits".into()],
        visits: vec![vec![10], vec![5]],
        time: vec![vec![1.0], vec![0.5]],
        call_tree: vec![],
    }
}

/// Two processes, user code on a call path into MPI and a separate kernel
pub fn mixed_document() -> ProfileDocument {
    ProfileDocument {
        regions: vec![
            RegionDefinition::new("main"),
            RegionDefinition::new("exchange"),
            RegionDefinition::new("MPI_Send"),
            RegionDefinition::new("kernel"),
            RegionDefinition::new("helper"),
            RegionDefinition::new("!$omp parallel @solver.c:10"),
        ],
        processes: vec![ProcessDefinition::with_locations(4), ProcessDefinition::with_locations(4)],
        metrics: vec!["time".into(), "visits".into()],
        visits: vec![
            vec![1, 1],
            vec![8, 8],
            vec![64, 32],
            vec![256, 512],
            vec![16, 0],
            vec![4, 4],
        ],
        time: vec![
            vec![1.0, 1.0],
            vec![0.5, 0.5],
            vec![2.0, 1.0],
            vec![4.0, 8.0],
            vec![0.25, 0.0],
            vec![1.0, 1.0],
        ],
        call_tree: vec![CallNode {
            region: 0,
            children: vec![
                CallNode {
                    region: 1,
                    children: vec![CallNode {
                        region: 2,
                        children: vec![],
                    }],
                },
                CallNode {
                    region: 3,
                    children: vec![CallNode {
                        region: 4,
                        children: vec![],
                    }],
                },
            ],
        }],
    }
}

pub fn estimate(document: ProfileDocument, file_size: u64) -> Estimator {
    let profile = JsonProfile::from_document(document, file_size).unwrap();
    Estimator::new(&profile, &EstimatorConfig::default(), &oracle()).unwrap()
}
