use serde::Serialize;

use super::{Job, JobId, TimeStep, TimingModel, Work};
use crate::utils::constants::EPSILON;

/// Execution time granted to a job inside one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    pub frame: usize,
    pub time: Work,
}

/// Every allocation of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAssignment {
    job: JobId,
    requirement: Work,
    allocations: Vec<Allocation>, // Sorted by frame, never two entries for the same frame
}

impl JobAssignment {
    pub fn new(job: &Job, mut allocations: Vec<Allocation>) -> Self {
        allocations.sort_by_key(|a| a.frame);
        Self {
            job: job.id(),
            requirement: job.requirement(),
            allocations,
        }
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn requirement(&self) -> Work {
        self.requirement
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn allocated(&self) -> Work {
        self.allocations.iter().map(|a| a.time).sum()
    }

    pub fn shortfall(&self) -> Work {
        (self.requirement - self.allocated()).max(0.0)
    }

    pub fn is_satisfied(&self) -> bool {
        self.allocated() + EPSILON >= self.requirement
    }

    /// Execution split across at least two frames.
    pub fn is_preempted(&self) -> bool {
        self.allocations.len() > 1
    }
}

/// A consecutive slice of a frame, either running a job or idle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameInterval {
    pub start: f64,
    pub end: f64,
    pub job: Option<JobId>,
}

/// Mapping from each job to the frames it executes in.
///
/// Produced by an assignment run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    frame_size: TimeStep,
    frame_count: usize,
    jobs: Vec<JobAssignment>, // Same order as the timing model's jobs
}

impl Assignment {
    pub fn new(frame_size: TimeStep, frame_count: usize, jobs: Vec<JobAssignment>) -> Self {
        Self {
            frame_size,
            frame_count,
            jobs,
        }
    }

    pub fn frame_size(&self) -> TimeStep {
        self.frame_size
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn jobs(&self) -> &[JobAssignment] {
        &self.jobs
    }

    pub fn job(&self, id: JobId) -> Option<&JobAssignment> {
        self.jobs.iter().find(|j| j.job == id)
    }

    /// Total execution time committed to a frame.
    pub fn frame_load(&self, frame: usize) -> Work {
        self.jobs
            .iter()
            .flat_map(|j| j.allocations.iter())
            .filter(|a| a.frame == frame)
            .map(|a| a.time)
            .sum()
    }

    /// Whether every job received its full requirement.
    pub fn is_complete(&self) -> bool {
        self.jobs.iter().all(|j| j.is_satisfied())
    }

    /// Total execution time allocated over all jobs.
    pub fn total_allocated(&self) -> Work {
        self.jobs.iter().map(|j| j.allocated()).sum()
    }

    /// Checks the capacity and window invariants against the timing model.
    ///
    /// # Returns
    /// * `Vec<String>` - One human readable line per violation, empty when valid.
    pub fn violations(&self, timing: &TimingModel) -> Vec<String> {
        let mut violations = Vec::new();

        for (assigned, job) in self.jobs.iter().zip(timing.jobs()) {
            if assigned.allocated() > job.requirement() + EPSILON {
                violations.push(format!(
                    "{} allocated {} above its requirement {}",
                    job.id(),
                    assigned.allocated(),
                    job.requirement()
                ));
            }
            for allocation in assigned.allocations.iter() {
                if !job.is_eligible(allocation.frame) {
                    violations.push(format!(
                        "{} placed in frame {} outside its window",
                        job.id(),
                        allocation.frame
                    ));
                }
            }
        }

        for frame in 0..self.frame_count {
            let load = self.frame_load(frame);
            if load > self.frame_size as Work + EPSILON {
                violations.push(format!("frame {} overloaded: {} > {}", frame, load, self.frame_size));
            }
        }

        violations
    }

    /// Lays the frames out as consecutive intervals over the major cycle.
    ///
    /// Jobs inside a frame run back to back in task id order; the rest of the
    /// frame is idle.
    pub fn timeline(&self) -> Vec<FrameInterval> {
        let mut intervals = Vec::new();

        for frame in 0..self.frame_count {
            let frame_start = (frame as TimeStep * self.frame_size) as f64;
            let frame_end = frame_start + self.frame_size as f64;

            let mut running: Vec<(JobId, Work)> = self
                .jobs
                .iter()
                .flat_map(|j| {
                    j.allocations
                        .iter()
                        .filter(move |a| a.frame == frame && a.time > EPSILON)
                        .map(move |a| (j.job, a.time))
                })
                .collect();
            running.sort_by_key(|(id, _)| *id);

            let mut time = frame_start;
            for (job, amount) in running {
                intervals.push(FrameInterval {
                    start: time,
                    end: time + amount,
                    job: Some(job),
                });
                time += amount;
            }

            if time + EPSILON < frame_end {
                intervals.push(FrameInterval {
                    start: time,
                    end: frame_end,
                    job: None,
                });
            }
        }

        intervals
    }
}
