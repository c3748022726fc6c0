use super::flow_scheduler::FlowSchedule;
use super::ilp_scheduler::IlpSchedule;
use crate::models::{Assignment, TimingModel};
use crate::utils::AssignmentCode;

/// A construction assigning the jobs of a timing model to frames.
///
/// Implementations own all of their working state for the duration of one call,
/// so a scheduler can serve several threads at once.
pub trait Scheduler: Sync {
    /// Name used in reports and batch summaries.
    fn name(&self) -> &'static str;

    /// Runs one assignment over an already validated timing model.
    fn assign(&self, timing: &TimingModel) -> Outcome;
}

/// What one assignment run produced.
///
/// The flow construction is best effort and always carries an assignment; the
/// ILP construction is all or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Flow(FlowSchedule),
    Ilp(IlpSchedule),
}

impl Outcome {
    pub fn is_feasible(&self) -> bool {
        match self {
            Outcome::Flow(schedule) => schedule.is_feasible(),
            Outcome::Ilp(schedule) => matches!(schedule, IlpSchedule::Feasible(_)),
        }
    }

    /// The produced allocations, if the run produced any.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Outcome::Flow(schedule) => Some(&schedule.assignment),
            Outcome::Ilp(IlpSchedule::Feasible(assignment)) => Some(assignment),
            Outcome::Ilp(_) => None,
        }
    }

    pub fn code(&self) -> AssignmentCode {
        match self {
            Outcome::Flow(schedule) => schedule.code(),
            Outcome::Ilp(IlpSchedule::Feasible(_)) => AssignmentCode::Feasible,
            Outcome::Ilp(IlpSchedule::Infeasible) => AssignmentCode::Infeasible,
            Outcome::Ilp(IlpSchedule::SolverFailed(_)) => AssignmentCode::SolverError,
        }
    }
}
