//! Assigns the jobs of a periodic taskset to the frames of a cyclic executive.
//!
//! Two constructions are provided: a maximum-flow assignment whose preempted jobs
//! are re-packed by best-fit-descending ([`NetworkFlowScheduler`]), and a 0-1
//! integer program searching directly for a non-preemptive assignment
//! ([`IlpScheduler`]).

pub mod batch;
pub mod core;
pub mod graph;
pub mod ilp;
pub mod models;
pub mod utils;

pub use models::scheduler;
pub use models::*;
pub use utils::{constants, errors};

pub use batch::{run_batch, BatchSummary};
pub use crate::core::{run, run_on, RunRecord, RunSummary};
pub use scheduler::{IlpScheduler, NetworkFlowScheduler, Outcome, Scheduler};
pub use utils::{AssignmentCode, EngineConfig, InvalidTasksetError, SolverError};
