use log::{info, warn};
use serde::Serialize;

use super::repair::{best_fit_descending, Relocation, RepairFailure};
use super::scheduler::{Outcome, Scheduler};
use crate::graph::{max_flow, FlowNetwork};
use crate::models::{Allocation, Assignment, FrameTable, JobAssignment, JobId, TimingModel, Work};
use crate::utils::constants::EPSILON;
use crate::utils::AssignmentCode;

/// How a job fared in the flow construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum JobService {
    /// Served in full by max-flow, inside a single frame.
    FullyServed,
    /// Split by max-flow, then moved whole into one frame.
    Repaired,
    /// Left short of its requirement.
    Unserved { shortfall: Work },
}

/// What happened to the jobs max-flow split across frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RepairOutcome {
    NotNeeded,
    Repaired(Vec<Relocation>),
    Failed(RepairFailure),
}

/// Result of the network-flow construction.
///
/// Always carries the allocations that could be achieved, even when infeasible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSchedule {
    pub assignment: Assignment,             // Final allocations after repair
    pub service: Vec<(JobId, JobService)>,  // Per job classification, in job order
    pub max_flow: Work,                     // Value of the maximum flow
    pub preempted: Vec<JobId>,              // Jobs split by max-flow
    pub partial: Vec<JobId>,                // Jobs max-flow could not serve in full
    pub repair: RepairOutcome,
}

impl FlowSchedule {
    pub fn is_feasible(&self) -> bool {
        !matches!(self.repair, RepairOutcome::Failed(_)) && self.assignment.is_complete()
    }

    pub fn repair_failure(&self) -> Option<&RepairFailure> {
        match &self.repair {
            RepairOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn service_of(&self, job: JobId) -> Option<JobService> {
        self.service.iter().find(|(id, _)| *id == job).map(|(_, s)| *s)
    }

    pub fn code(&self) -> AssignmentCode {
        if self.repair_failure().is_some() {
            AssignmentCode::RepairFailure
        } else if !self.assignment.is_complete() {
            AssignmentCode::PartialService
        } else {
            AssignmentCode::Feasible
        }
    }
}

/// Max-flow preemptive assignment followed by best-fit-descending repair.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFlowScheduler;

impl NetworkFlowScheduler {
    /// Builds and solves the flow network, then repairs preempted jobs.
    pub fn schedule(&self, timing: &TimingModel) -> FlowSchedule {
        let jobs = timing.jobs();
        let mut network = FlowNetwork::build(jobs, timing.frame_count(), timing.frame_size());
        let flow = max_flow(&mut network);

        let mut allocations: Vec<Vec<Allocation>> = (0..jobs.len())
            .map(|index| {
                network
                    .job_flows(index)
                    .filter(|&(_, time)| time > EPSILON)
                    .map(|(frame, time)| Allocation { frame, time })
                    .collect()
            })
            .collect();

        let partial: Vec<JobId> = jobs
            .iter()
            .zip(allocations.iter())
            .filter(|(job, alloc)| alloc.iter().map(|a| a.time).sum::<Work>() + EPSILON < job.requirement())
            .map(|(job, _)| job.id())
            .collect();

        let preempted: Vec<usize> = (0..jobs.len()).filter(|&i| allocations[i].len() > 1).collect();

        // capacity left once every unpreempted job keeps its flow
        let mut frames = FrameTable::new(timing.frame_count(), timing.frame_size());
        for (index, alloc) in allocations.iter().enumerate() {
            if !preempted.contains(&index) {
                alloc.iter().for_each(|a| frames.charge(a.frame, a.time));
            }
        }
        for &index in preempted.iter() {
            allocations[index].clear();
        }

        let repair = if preempted.is_empty() {
            RepairOutcome::NotNeeded
        } else {
            match best_fit_descending(jobs, &preempted, &mut frames) {
                Ok(relocations) => RepairOutcome::Repaired(relocations),
                Err(failure) => {
                    warn!("repair failed: {} ({}) fits in no eligible frame", failure.job, failure.requirement);
                    RepairOutcome::Failed(failure)
                }
            }
        };

        let relocations: &[Relocation] = match &repair {
            RepairOutcome::NotNeeded => &[],
            RepairOutcome::Repaired(relocations) => relocations,
            RepairOutcome::Failed(failure) => &failure.placed,
        };
        let mut repaired = Vec::with_capacity(relocations.len());
        for relocation in relocations {
            if let Some(index) = jobs.iter().position(|j| j.id() == relocation.job) {
                allocations[index] = vec![Allocation { frame: relocation.frame, time: relocation.time }];
                repaired.push(relocation.job);
            }
        }

        let assigned: Vec<JobAssignment> = jobs
            .iter()
            .zip(allocations)
            .map(|(job, alloc)| JobAssignment::new(job, alloc))
            .collect();

        let service = assigned
            .iter()
            .map(|a| {
                let service = if !a.is_satisfied() {
                    JobService::Unserved { shortfall: a.shortfall() }
                } else if repaired.contains(&a.job()) {
                    JobService::Repaired
                } else {
                    JobService::FullyServed
                };
                (a.job(), service)
            })
            .collect();

        if !partial.is_empty() {
            warn!("{} job(s) only partially served by max-flow", partial.len());
        }

        FlowSchedule {
            assignment: Assignment::new(timing.frame_size(), timing.frame_count(), assigned),
            service,
            max_flow: flow.value,
            preempted: preempted.iter().map(|&i| jobs[i].id()).collect(),
            partial,
            repair,
        }
    }
}

impl Scheduler for NetworkFlowScheduler {
    fn name(&self) -> &'static str {
        "NetworkFlowScheduler"
    }

    fn assign(&self, timing: &TimingModel) -> Outcome {
        let schedule = self.schedule(timing);
        info!(
            "{}: max flow {}, {} preempted, {:?}",
            self.name(),
            schedule.max_flow,
            schedule.preempted.len(),
            schedule.code()
        );
        Outcome::Flow(schedule)
    }
}
