use std::time::Duration;

use thiserror::Error;

use crate::models::{TimeStep, ID};

/// Structural problems with a taskset, detected before any graph or model is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidTasksetError {
    #[error("taskset contains no task")]
    EmptyTaskSet,

    #[error("the allowed period set is empty or contains a zero period")]
    EmptyPeriodSet,

    #[error("task id {task} appears more than once")]
    DuplicateTaskId { task: ID },

    #[error("task {task}: period {period} is not one of the allowed periods {allowed:?}")]
    DisallowedPeriod { task: ID, period: TimeStep, allowed: Vec<TimeStep> },

    #[error("task {task}: wcet {wcet} must be positive, finite and below the period")]
    InvalidWcet { task: ID, wcet: f64 },

    #[error("task {task}: deadline {deadline} exceeds period {period}")]
    DeadlineExceedsPeriod { task: ID, deadline: TimeStep, period: TimeStep },

    #[error("task {task}: wcet {wcet} exceeds deadline {deadline}")]
    WcetExceedsDeadline { task: ID, wcet: f64, deadline: TimeStep },

    #[error("task {task}: offset {offset} must be smaller than period {period}")]
    OffsetOutOfRange { task: ID, offset: TimeStep, period: TimeStep },

    #[error("periods {periods:?} give a major cycle beyond {limit} frames")]
    HorizonTooLarge { periods: Vec<TimeStep>, limit: u64 },

    #[error("time window [{start}, {end}) is not a positive multiple of the major cycle {major_cycle}")]
    HorizonMismatch { start: TimeStep, end: TimeStep, major_cycle: TimeStep },
}

/// Failures of the ILP solver that must not be read as a proof of infeasibility.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("solver exceeded its time limit of {limit:?}")]
    TimeLimitExceeded { limit: Duration },

    #[error("solver explored {nodes} nodes without reaching a verdict")]
    NodeLimitExceeded { nodes: u64 },

    #[error("solver returned a solution violating constraint `{constraint}`")]
    InvalidSolution { constraint: String },

    #[error("malformed model: {0}")]
    MalformedModel(String),
}

/// Errors raised while reading a taskset or configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("malformed csv record: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed json document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse field `{field}` from `{value}`")]
    Field { field: &'static str, value: String },
}
