use proptest::prelude::*;

use super::{IlpSchedule, IlpScheduler, NetworkFlowScheduler, RepairOutcome};
use crate::graph::{max_flow, FlowNetwork};
use crate::ilp::BranchAndBound;
use crate::utils::constants::{DEFAULT_PERIODS, EPSILON};
use crate::{EngineConfig, Task, TaskSet, TimeStep, TimingModel};

const NODE_LIMIT: u64 = 200_000;

/// Tasks with `offset < period`, `deadline <= period` and `wcet < deadline`.
fn tasks_strategy() -> impl Strategy<Value = Vec<Task>> {
    let task = (0usize..DEFAULT_PERIODS.len(), 0.0f64..1.0, 0.0f64..1.0, 0.01f64..0.6);
    prop::collection::vec(task, 1..5).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (p, offset, slack, u))| {
                let period = DEFAULT_PERIODS[p];
                let offset = (period as f64 * offset) as TimeStep;
                let deadline = period - (period as f64 * slack * slack) as TimeStep;
                Task::new(i as u32 + 1, offset, deadline as f64 * u, deadline, period)
            })
            .collect()
    })
}

fn timing(tasks: Vec<Task>) -> TimingModel {
    TimingModel::new(&TaskSet::new(tasks), &EngineConfig::default()).unwrap()
}

fn ilp() -> IlpScheduler {
    IlpScheduler::with_solver(BranchAndBound::new(None, Some(NODE_LIMIT)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_max_flow_conserves_and_respects_capacity(tasks in tasks_strategy()) {
        let timing = timing(tasks);
        let mut network = FlowNetwork::build(timing.jobs(), timing.frame_count(), timing.frame_size());
        let flow = max_flow(&mut network);

        prop_assert!(network.is_valid_flow());
        prop_assert!(flow.value <= timing.jobs().iter().map(|j| j.requirement()).sum::<f64>() + EPSILON);
    }

    #[test]
    fn prop_flow_schedule_invariants(tasks in tasks_strategy()) {
        let timing = timing(tasks);
        let schedule = NetworkFlowScheduler.schedule(&timing);

        prop_assert!(schedule.assignment.violations(&timing).is_empty());
        prop_assert_eq!(schedule.service.len(), timing.jobs().len());

        if let RepairOutcome::Repaired(relocations) = &schedule.repair {
            for relocation in relocations {
                let job = schedule.assignment.job(relocation.job).unwrap();
                prop_assert_eq!(job.allocations().len(), 1);
                prop_assert!(job.is_satisfied());
            }
        }
        if schedule.is_feasible() {
            prop_assert!(schedule.assignment.jobs().iter().all(|j| j.allocations().len() == 1));
        }
    }

    #[test]
    fn prop_eligible_frames_lie_inside_job_window(tasks in tasks_strategy()) {
        let timing = timing(tasks);

        for job in timing.jobs() {
            for frame in job.eligible_frames() {
                let (start, end) = timing.frame_bounds(frame);
                prop_assert!(start >= job.release_time());
                prop_assert!(end <= job.absolute_deadline());
                prop_assert!(frame < timing.frame_count());
            }
        }
    }

    #[test]
    fn prop_runs_are_deterministic(tasks in tasks_strategy()) {
        let timing = timing(tasks);

        prop_assert_eq!(NetworkFlowScheduler.schedule(&timing), NetworkFlowScheduler.schedule(&timing));
        prop_assert_eq!(ilp().schedule(&timing), ilp().schedule(&timing));
    }

    #[test]
    fn prop_ilp_assignment_is_non_preemptive(tasks in tasks_strategy()) {
        let timing = timing(tasks);

        if let IlpSchedule::Feasible(assignment) = ilp().schedule(&timing) {
            prop_assert!(assignment.violations(&timing).is_empty());
            prop_assert!(assignment.is_complete());
            prop_assert!(assignment.jobs().iter().all(|j| j.allocations().len() == 1));
        }
    }

    #[test]
    fn prop_flow_success_implies_ilp_success(tasks in tasks_strategy()) {
        let timing = timing(tasks);

        if NetworkFlowScheduler.schedule(&timing).is_feasible() {
            let verdict = ilp().schedule(&timing);
            prop_assert!(!matches!(verdict, IlpSchedule::Infeasible));
        }
    }

    #[test]
    fn prop_larger_wcet_never_turns_feasible(tasks in tasks_strategy(), pick in any::<prop::sample::Index>(), growth in 1.0f64..2.0) {
        let index = pick.index(tasks.len());
        let task = &tasks[index];
        let grown = (task.wcet() * growth).min(task.deadline() as f64 - 0.01);
        prop_assume!(grown >= task.wcet());

        let mut heavier = tasks.clone();
        heavier[index] = task.with_wcet(grown);

        let before = ilp().schedule(&timing(tasks));
        let after = ilp().schedule(&timing(heavier));

        if before == IlpSchedule::Infeasible {
            prop_assert!(!matches!(after, IlpSchedule::Feasible(_)));
        }
    }
}
