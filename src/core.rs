use std::time::{Duration, Instant};

use log::info;
use serde::Serialize;

use crate::models::scheduler::{FlowSchedule, IlpSchedule, Outcome, Scheduler};
use crate::utils::{AssignmentCode, EngineConfig, InvalidTasksetError};
use crate::{Assignment, TaskSet, TimingModel};

/// One assignment run as seen by a caller: who ran, how long, what came out.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub scheduler: &'static str,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl RunRecord {
    pub fn is_feasible(&self) -> bool {
        self.outcome.is_feasible()
    }

    pub fn code(&self) -> AssignmentCode {
        self.outcome.code()
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.outcome.assignment()
    }

    /// Flattens the record for printing or JSON output.
    pub fn summary(&self) -> RunSummary {
        let detail = match &self.outcome {
            Outcome::Flow(schedule) => flow_detail(schedule),
            Outcome::Ilp(IlpSchedule::Feasible(_)) => None,
            Outcome::Ilp(IlpSchedule::Infeasible) => Some("no non-preemptive assignment exists".to_string()),
            Outcome::Ilp(IlpSchedule::SolverFailed(error)) => Some(error.to_string()),
        };

        RunSummary {
            scheduler: self.scheduler,
            feasible: self.is_feasible(),
            code: format!("{:?}", self.code()),
            elapsed_secs: self.elapsed.as_secs_f64(),
            detail,
            assignment: self.assignment().cloned(),
        }
    }
}

fn flow_detail(schedule: &FlowSchedule) -> Option<String> {
    if let Some(failure) = schedule.repair_failure() {
        return Some(format!(
            "repair failed on {} (requirement {}), {} job(s) abandoned",
            failure.job,
            failure.requirement,
            failure.abandoned.len()
        ));
    }
    if !schedule.partial.is_empty() {
        let names: Vec<String> = schedule.partial.iter().map(|j| j.to_string()).collect();
        return Some(format!("partially served: {}", names.join(", ")));
    }
    None
}

/// Serializable view of a [`RunRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scheduler: &'static str,
    pub feasible: bool,
    pub code: String,
    pub elapsed_secs: f64,
    pub detail: Option<String>,
    pub assignment: Option<Assignment>,
}

/// Runs a scheduler on an already built timing model, timing the assignment.
pub fn run_on(scheduler: &dyn Scheduler, timing: &TimingModel) -> RunRecord {
    let started = Instant::now();
    let outcome = scheduler.assign(timing);
    let elapsed = started.elapsed();

    info!("{} finished in {:?}: {:?}", scheduler.name(), elapsed, outcome.code());

    RunRecord {
        scheduler: scheduler.name(),
        elapsed,
        outcome,
    }
}

/// Validates a taskset and runs one scheduler on it.
///
/// # Returns
/// * `Result<RunRecord, InvalidTasksetError>` - Structural problems abort before any
///   algorithm runs; every other outcome, infeasibility included, is in the record.
pub fn run(scheduler: &dyn Scheduler, taskset: &TaskSet, config: &EngineConfig) -> Result<RunRecord, InvalidTasksetError> {
    let timing = TimingModel::new(taskset, config)?;
    Ok(run_on(scheduler, &timing))
}
