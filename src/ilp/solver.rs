use super::model::IlpModel;
use crate::utils::SolverError;

/// What a solver concluded about a model.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverStatus {
    /// Proven optimal. With a constant objective any feasible point is optimal.
    Optimal(Vec<bool>),
    /// Feasible, optimality not proven.
    Feasible(Vec<bool>),
    /// Proven to admit no solution.
    Infeasible,
}

/// A combinatorial solver able to decide 0-1 feasibility models.
///
/// Timeouts and internal failures are reported as [`SolverError`], never as
/// [`SolverStatus::Infeasible`].
pub trait IlpSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &IlpModel) -> Result<SolverStatus, SolverError>;
}
