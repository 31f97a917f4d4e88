//! The fixed event rule set of the measurement system.
//!
//! Each list names the regions (or region prefixes) that write a given
//! record type into the trace.

use super::catalog::{Event, EventCatalog, EventPredicate};
use log::debug;

const MPI_SEND: &[&str] = &[
    "MPI_Bsend",
    "MPI_Rsend",
    "MPI_Ssend",
    "MPI_Sendrecv",
    "MPI_Sendrecv_replace",
    "MPI_Send",
];

const MPI_ISEND: &[&str] = &[
    "MPI_Ibsend",
    "MPI_Irsend",
    "MPI_Issend",
    "MPI_Isend",
    "MPI_Bsend_init",
    "MPI_Rsend_init",
    "MPI_Send_init",
    "MPI_Ssend_init",
];

const MPI_RECV: &[&str] = &["MPI_Sendrecv", "MPI_Sendrecv_replace", "MPI_Recv"];

const MPI_IRECV: &[&str] = &["MPI_Irecv", "MPI_Irecv_init"];

const MPI_COLLECTIVE: &[&str] = &[
    "MPI_Allgather",
    "MPI_Allgatherv",
    "MPI_Allreduce",
    "MPI_Alltoall",
    "MPI_Alltoallv",
    "MPI_Alltoallw",
    "MPI_Barrier",
    "MPI_Bcast",
    "MPI_Exscan",
    "MPI_Gather",
    "MPI_Gatherv",
    "MPI_Reduce",
    "MPI_Reduce_scatter",
    "MPI_Reduce_scatter_block",
    "MPI_Scan",
    "MPI_Scatter",
    "MPI_Scatterv",
];

// pthread_mutex_trylock is left out: only the unlocks are reliable
const THREAD_ACQUIRE_LOCK: &[&str] = &[
    "omp_set_lock",
    "omp_set_nest_lock",
    "pthread_mutex_unlock",
    "pthread_cond_wait",
    "pthread_cond_timedwait",
];

const THREAD_RELEASE_LOCK: &[&str] = &[
    "omp_unset_lock",
    "omp_unset_nest_lock",
    "pthread_mutex_unlock",
    "pthread_cond_wait",
    "pthread_cond_timedwait",
];

const SHMEM_TYPES: &[&str] = &["char", "short", "int", "long", "float", "double", "longlong", "longdouble"];
const SHMEM_STRIDED_TYPES: &[&str] = &["short", "int", "float", "long", "double", "longlong", "longdouble"];
const SHMEM_WIDTHS: &[&str] = &["16", "32", "64", "128"];

const SHMEM_COMPLETE_REMOTE: &[&str] = &["shmem_barrier_all"];

const SHMEM_WAIT_CHANGE: &[&str] = &[
    "shmem_short_wait",
    "shmem_int_wait",
    "shmem_long_wait",
    "shmem_longlong_wait",
    "shmem_wait",
    "shmem_short_wait_until",
    "shmem_int_wait_until",
    "shmem_long_wait_until",
    "shmem_longlong_wait_until",
    "shmem_wait_until",
];

const SHMEM_LOCK: &[&str] = &["shmem_set_lock", "shmem_test_lock"];

const SHMEM_RELEASE_LOCK: &[&str] = &["shmem_clear_lock"];

const OMP_PARALLEL: &[&str] = &["!$omp parallel"];
// Trailing space: only task creation, not taskwait
const OMP_TASK_CREATE: &[&str] = &["!$omp task "];
const OMP_TASK_SWITCH: &[&str] = &["!$omp task"];
const PTHREAD_CREATE: &[&str] = &["pthread_create"];
const PTHREAD_JOIN: &[&str] = &["pthread_join"];

/// Build the catalog of every event the measurement system can write
///
/// **Public** - called once per estimator
///
/// # Arguments
/// * `dense_metrics` - metrics recorded with each enter/leave; 0 registers no metric event
pub fn standard_catalog(dense_metrics: u64) -> EventCatalog {
    let mut catalog = EventCatalog::new();

    catalog.register(Event::new("Timestamp", EventPredicate::AlwaysNonParameter).doubled());
    catalog.register(Event::new("Enter", EventPredicate::AlwaysNonParameter));
    catalog.register(Event::new("Leave", EventPredicate::AlwaysNonParameter));
    if dense_metrics > 0 {
        catalog.register(
            Event::new(format!("Metric {}", dense_metrics), EventPredicate::AlwaysNonParameter).doubled(),
        );
    }
    catalog.register(Event::new("ParameterInt", EventPredicate::ParameterOnly));

    register_names(&mut catalog, &["MpiSend"], MPI_SEND);
    register_names(&mut catalog, &["MpiIsend", "MpiIsendComplete"], MPI_ISEND);
    register_names(&mut catalog, &["MpiIrecvRequest", "MpiIrecv"], MPI_IRECV);
    register_names(&mut catalog, &["MpiRecv"], MPI_RECV);
    register_names(&mut catalog, &["MpiCollectiveBegin", "MpiCollectiveEnd"], MPI_COLLECTIVE);
    register_names(&mut catalog, &["ThreadAcquireLock"], THREAD_ACQUIRE_LOCK);
    register_names(&mut catalog, &["ThreadReleaseLock"], THREAD_RELEASE_LOCK);

    let rma_ops = shmem_rma_ops();
    register_names(&mut catalog, &["RmaPut", "RmaOpCompleteBlocking"], rma_ops.as_slice());
    register_names(&mut catalog, &["RmaOpCompleteRemote"], SHMEM_COMPLETE_REMOTE);
    // Re-registers RmaOpCompleteBlocking: atomics replace the put/get set
    let atomics = shmem_atomics();
    register_names(&mut catalog, &["RmaAtomic", "RmaOpCompleteBlocking"], atomics.as_slice());
    let collectives = shmem_collectives();
    register_names(&mut catalog, &["RmaCollectiveBegin", "RmaCollectiveEnd"], collectives.as_slice());
    register_names(&mut catalog, &["RmaWaitChange"], SHMEM_WAIT_CHANGE);
    register_names(&mut catalog, &["RmaRequestLock"], SHMEM_LOCK);
    register_names(&mut catalog, &["RmaReleaseLock"], SHMEM_RELEASE_LOCK);

    register_prefixes(&mut catalog, &["ThreadFork", "ThreadJoin", "ThreadTeamBegin", "ThreadTeamEnd"], OMP_PARALLEL);
    register_prefixes(&mut catalog, &["ThreadTaskCreate", "ThreadTaskComplete"], OMP_TASK_CREATE);
    register_prefixes(&mut catalog, &["ThreadTaskSwitch"], OMP_TASK_SWITCH);
    register_prefixes(&mut catalog, &["ThreadCreate", "ThreadBegin", "ThreadEnd"], PTHREAD_CREATE);
    register_prefixes(&mut catalog, &["ThreadWait"], PTHREAD_JOIN);

    debug!("Registered {} trace events", catalog.len());

    catalog
}

fn register_names<S: AsRef<str>>(catalog: &mut EventCatalog, events: &[&str], regions: &[S]) {
    for event in events {
        let predicate = EventPredicate::name_set(regions.iter().map(|r| r.as_ref().to_string()));
        catalog.register(Event::new(*event, predicate));
    }
}

fn register_prefixes(catalog: &mut EventCatalog, events: &[&str], prefixes: &[&str]) {
    for event in events {
        catalog.register(Event::new(*event, EventPredicate::prefix_set(prefixes.iter().copied())));
    }
}

/// Put and get calls: scalar, bulk, fixed-width and strided
fn shmem_rma_ops() -> Vec<String> {
    let mut names = Vec::new();
    for (scalar, bulk, strided) in [("p", "put", "iput"), ("g", "get", "iget")] {
        names.extend(SHMEM_TYPES.iter().map(|t| format!("shmem_{}_{}", t, scalar)));
        names.extend(SHMEM_TYPES.iter().map(|t| format!("shmem_{}_{}", t, bulk)));
        names.extend(SHMEM_WIDTHS.iter().map(|w| format!("shmem_{}{}", bulk, w)));
        names.push(format!("shmem_{}mem", bulk));
        names.extend(SHMEM_STRIDED_TYPES.iter().map(|t| format!("shmem_{}_{}", t, strided)));
        names.extend(SHMEM_WIDTHS.iter().map(|w| format!("shmem_{}{}", strided, w)));
    }
    names
}

fn shmem_atomics() -> Vec<String> {
    let mut names: Vec<String> = ["short", "int", "long"]
        .iter()
        .map(|t| format!("shmem_{}_swap", t))
        .collect();
    names.push("shmem_swap".to_string());
    names.extend(["longlong", "float", "double"].iter().map(|t| format!("shmem_{}_swap", t)));

    for op in ["cswap", "fadd", "finc", "add", "inc"] {
        names.extend(["short", "int", "long", "longlong"].iter().map(|t| format!("shmem_{}_{}", t, op)));
    }
    names
}

fn shmem_collectives() -> Vec<String> {
    let mut names: Vec<String> = [
        "shmem_barrier_all",
        "shmem_barrier",
        "shmem_broadcast32",
        "shmem_broadcast64",
        "shmem_collect32",
        "shmem_collect64",
        "shmem_fcollect32",
        "shmem_fcollect64",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let integer = ["short", "int", "long", "longlong"];
    let ordered = ["short", "int", "long", "float", "double", "longlong", "longdouble"];
    let arithmetic = [
        "short", "int", "long", "float", "double", "longlong", "longdouble", "complexf", "complexd",
    ];

    for op in ["and", "or", "xor"] {
        names.extend(integer.iter().map(|t| format!("shmem_{}_{}_to_all", t, op)));
    }
    for op in ["max", "min"] {
        names.extend(ordered.iter().map(|t| format!("shmem_{}_{}_to_all", t, op)));
    }
    for op in ["sum", "prod"] {
        names.extend(arithmetic.iter().map(|t| format!("shmem_{}_{}_to_all", t, op)));
    }
    names
}
