use log::{info, warn};

use super::scheduler::{Outcome, Scheduler};
use crate::ilp::{BranchAndBound, IlpModel, IlpSolver, Relation, SolverStatus, VarId};
use crate::models::{Allocation, Assignment, JobAssignment, TimingModel};
use crate::utils::{EngineConfig, SolverError};

/// Result of the ILP construction: a complete non-preemptive assignment or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum IlpSchedule {
    Feasible(Assignment),
    Infeasible,
    SolverFailed(SolverError),
}

/// The job-to-frame model together with the meaning of each variable.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    pub model: IlpModel,
    variables: Vec<(usize, usize)>, // Per variable: (job index, frame)
}

impl AssignmentModel {
    /// Creates `x[job][frame]` for every eligible pair, one `= 1` row per job and
    /// one capacity row per frame.
    pub fn build(timing: &TimingModel) -> Self {
        let jobs = timing.jobs();
        let mut model = IlpModel::new("CyclicExecutive");
        let mut variables = Vec::new();
        let mut by_frame: Vec<Vec<(VarId, f64)>> = vec![Vec::new(); timing.frame_count()];

        for (index, job) in jobs.iter().enumerate() {
            let mut row = Vec::new();
            for frame in job.eligible_frames().filter(|&f| f < timing.frame_count()) {
                let id = job.id();
                let var = model.add_binary(format!("x_{}_{}_{}", id.task_id, id.index, frame));
                variables.push((index, frame));
                row.push((var, 1.0));
                by_frame[frame].push((var, job.requirement()));
            }
            model.add_constraint(format!("jobAssign_{}", job.id()), row, Relation::Equal, 1.0);
        }

        for (frame, terms) in by_frame.into_iter().enumerate() {
            model.add_constraint(
                format!("frameCap_{}", frame),
                terms,
                Relation::LessOrEqual,
                timing.frame_size() as f64,
            );
        }

        Self { model, variables }
    }

    /// Turns solver values into an assignment, refusing values that break the model.
    pub fn decode(&self, timing: &TimingModel, values: &[bool]) -> Result<Assignment, SolverError> {
        if values.len() != self.variables.len() {
            return Err(SolverError::InvalidSolution {
                constraint: format!("{} values for {} variables", values.len(), self.variables.len()),
            });
        }
        if let Some(violated) = self.model.first_violation(values) {
            return Err(SolverError::InvalidSolution { constraint: violated.name.clone() });
        }

        let jobs = timing.jobs();
        let mut allocations: Vec<Vec<Allocation>> = vec![Vec::new(); jobs.len()];
        for (&(index, frame), _) in self.variables.iter().zip(values).filter(|(_, set)| **set) {
            allocations[index].push(Allocation { frame, time: jobs[index].requirement() });
        }

        let assigned = jobs
            .iter()
            .zip(allocations)
            .map(|(job, alloc)| JobAssignment::new(job, alloc))
            .collect();

        Ok(Assignment::new(timing.frame_size(), timing.frame_count(), assigned))
    }
}

/// Non-preemptive assignment by 0-1 integer programming.
pub struct IlpScheduler<S: IlpSolver = BranchAndBound> {
    solver: S,
}

impl IlpScheduler<BranchAndBound> {
    /// Uses the built-in branch-and-bound solver with the configured limits.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_solver(BranchAndBound::new(config.solver_time_limit(), config.solver_node_limit))
    }
}

impl<S: IlpSolver> IlpScheduler<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn schedule(&self, timing: &TimingModel) -> IlpSchedule {
        let model = AssignmentModel::build(timing);

        let values = match self.solver.solve(&model.model) {
            Ok(SolverStatus::Optimal(values)) | Ok(SolverStatus::Feasible(values)) => values,
            Ok(SolverStatus::Infeasible) => return IlpSchedule::Infeasible,
            Err(error) => {
                warn!("{} solver failed: {}", self.solver.name(), error);
                return IlpSchedule::SolverFailed(error);
            }
        };

        match model.decode(timing, &values) {
            Ok(assignment) => IlpSchedule::Feasible(assignment),
            Err(error) => {
                warn!("{} returned an unusable solution: {}", self.solver.name(), error);
                IlpSchedule::SolverFailed(error)
            }
        }
    }
}

impl<S: IlpSolver + Sync> Scheduler for IlpScheduler<S> {
    fn name(&self) -> &'static str {
        "IlpScheduler"
    }

    fn assign(&self, timing: &TimingModel) -> Outcome {
        let schedule = self.schedule(timing);
        info!(
            "{}: {}",
            self.name(),
            match &schedule {
                IlpSchedule::Feasible(_) => "feasible",
                IlpSchedule::Infeasible => "infeasible",
                IlpSchedule::SolverFailed(_) => "solver error",
            }
        );
        Outcome::Ilp(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JobId, Task, TaskSet};

    fn timing(tasks: Vec<Task>) -> TimingModel {
        TimingModel::new(&TaskSet::new(tasks), &EngineConfig::default()).unwrap()
    }

    /// Answers with a fixed status, for exercising the adapter.
    struct Canned(Result<SolverStatus, SolverError>);

    impl IlpSolver for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn solve(&self, _: &IlpModel) -> Result<SolverStatus, SolverError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_model_shape() {
        let timing = timing(vec![Task::new(1, 0, 1.0, 6, 6), Task::new(2, 0, 4.0, 12, 12)]);
        let model = AssignmentModel::build(&timing);

        // J1.0 -> {0}, J1.1 -> {1}, J2.0 -> {0, 1}
        assert_eq!(model.model.variable_count(), 4);
        assert_eq!(model.model.variable_name(VarId(3)), "x_2_0_1");
        assert_eq!(model.model.constraints().len(), 3 + 2);
        assert_eq!(model.model.constraints()[3].name, "frameCap_0");
        assert_eq!(model.model.constraints()[3].terms, vec![(VarId(0), 1.0), (VarId(2), 4.0)]);
    }

    #[test]
    fn test_feasible_non_preemptive_assignment() {
        let timing = timing(vec![
            Task::new(1, 0, 1.0, 6, 6),
            Task::new(2, 0, 4.0, 12, 12),
            Task::new(3, 0, 4.0, 12, 12),
        ]);
        let schedule = IlpScheduler::new(&EngineConfig::default()).schedule(&timing);

        let IlpSchedule::Feasible(assignment) = schedule else {
            panic!("expected a feasible assignment");
        };
        assert!(assignment.is_complete());
        assert!(assignment.violations(&timing).is_empty());
        assert!(assignment.jobs().iter().all(|j| j.allocations().len() == 1));
        assert_eq!(assignment.job(JobId::new(2, 0)).unwrap().allocations()[0].frame, 0);
        assert_eq!(assignment.job(JobId::new(3, 0)).unwrap().allocations()[0].frame, 1);
    }

    #[test]
    fn test_overload_is_infeasible() {
        let timing = timing(vec![Task::new(1, 0, 4.0, 6, 6), Task::new(2, 0, 3.0, 6, 6)]);
        let schedule = IlpScheduler::new(&EngineConfig::default()).schedule(&timing);
        assert_eq!(schedule, IlpSchedule::Infeasible);
    }

    #[test]
    fn test_slight_multi_frame_overload_is_infeasible() {
        // 24 interchangeable jobs of 1.01 plus 4 of 0.01: 24.28 units against 4 frames of 6
        let mut tasks: Vec<Task> = (1..=24).map(|id| Task::new(id, 0, 1.01, 24, 24)).collect();
        tasks.push(Task::new(25, 0, 0.01, 6, 6));
        let timing = timing(tasks);
        assert_eq!(timing.frame_count(), 4);

        let config = EngineConfig { solver_node_limit: Some(0), ..EngineConfig::default() }
            .with_time_limit(Some(std::time::Duration::from_secs(5)));
        let scheduler = IlpScheduler::new(&config);

        assert_eq!(scheduler.schedule(&timing), IlpSchedule::Infeasible);
        assert_eq!(scheduler.assign(&timing).code(), crate::utils::AssignmentCode::Infeasible);
    }

    #[test]
    fn test_preemption_required_is_infeasible() {
        let timing = timing(vec![Task::new(1, 0, 4.0, 6, 6), Task::new(2, 0, 3.0, 12, 12)]);
        let schedule = IlpScheduler::new(&EngineConfig::default()).schedule(&timing);
        assert_eq!(schedule, IlpSchedule::Infeasible);
    }

    #[test]
    fn test_solver_error_is_not_infeasibility() {
        let timing = timing(vec![Task::new(1, 0, 1.0, 6, 6)]);
        let error = SolverError::TimeLimitExceeded { limit: std::time::Duration::from_millis(5) };
        let scheduler = IlpScheduler::with_solver(Canned(Err(error.clone())));

        assert_eq!(scheduler.schedule(&timing), IlpSchedule::SolverFailed(error));
        assert_eq!(
            scheduler.assign(&timing).code(),
            crate::utils::AssignmentCode::SolverError
        );
    }

    #[test]
    fn test_invalid_solution_is_rejected() {
        let timing = timing(vec![Task::new(1, 0, 1.0, 6, 6)]);
        // the only job left unassigned
        let scheduler = IlpScheduler::with_solver(Canned(Ok(SolverStatus::Feasible(vec![false]))));

        assert!(matches!(
            scheduler.schedule(&timing),
            IlpSchedule::SolverFailed(SolverError::InvalidSolution { .. })
        ));
    }
}
