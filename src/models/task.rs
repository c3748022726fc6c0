use serde::{Deserialize, Serialize};

use super::{job::Job, JobId, TimeStep, Work, ID};
use crate::utils::constants::EPSILON;
use crate::utils::InvalidTasksetError;

/// A recurring task, immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    task_id: ID,
    offset: TimeStep,   // O_i : Initial release delay.
    wcet: Work,         // C_i : Worst-case execution time.
    deadline: TimeStep, // D_i : Relative deadline.
    period: TimeStep,   // T_i : Period.
}

impl Task {
    pub fn new(id: ID, offset: TimeStep, wcet: Work, deadline: TimeStep, period: TimeStep) -> Self {
        Self {
            task_id: id,
            offset,
            wcet,
            deadline,
            period,
        }
    }

    pub fn id(&self) -> ID {
        self.task_id
    }

    pub fn offset(&self) -> TimeStep {
        self.offset
    }

    pub fn wcet(&self) -> Work {
        self.wcet
    }

    pub fn deadline(&self) -> TimeStep {
        self.deadline
    }

    pub fn period(&self) -> TimeStep {
        self.period
    }

    pub fn utilisation(&self) -> f64 {
        self.wcet / self.period as f64
    }

    /// Returns a copy of the task with a different worst-case execution time.
    pub fn with_wcet(&self, wcet: Work) -> Self {
        Self { wcet, ..self.clone() }
    }

    /// Checks that the task can be scheduled at all under the given period set.
    ///
    /// # Arguments
    /// * `allowed_periods` - The periods a task is permitted to declare.
    ///
    /// # Returns
    /// * `Result<(), InvalidTasksetError>` - The first violated rule, if any.
    pub fn validate(&self, allowed_periods: &[TimeStep]) -> Result<(), InvalidTasksetError> {
        let task = self.task_id;

        if !allowed_periods.contains(&self.period) {
            return Err(InvalidTasksetError::DisallowedPeriod {
                task,
                period: self.period,
                allowed: allowed_periods.to_vec(),
            });
        }

        if !self.wcet.is_finite() || self.wcet <= 0.0 || self.wcet >= self.period as f64 {
            return Err(InvalidTasksetError::InvalidWcet { task, wcet: self.wcet });
        }

        if self.deadline > self.period {
            return Err(InvalidTasksetError::DeadlineExceedsPeriod {
                task,
                deadline: self.deadline,
                period: self.period,
            });
        }

        if self.wcet > self.deadline as f64 + EPSILON {
            return Err(InvalidTasksetError::WcetExceedsDeadline {
                task,
                wcet: self.wcet,
                deadline: self.deadline,
            });
        }

        if self.offset >= self.period {
            return Err(InvalidTasksetError::OffsetOutOfRange {
                task,
                offset: self.offset,
                period: self.period,
            });
        }

        Ok(())
    }

    /// Spawns every job released inside `[0, major_cycle)`.
    ///
    /// A job is eligible for frame `f` when `[f * frame_size, (f + 1) * frame_size)`
    /// lies within its `[release, absolute deadline)` window and inside the horizon.
    pub fn spawn_jobs(&self, major_cycle: TimeStep, frame_size: TimeStep) -> Vec<Job> {
        let frame_count = (major_cycle / frame_size) as usize;

        (0..major_cycle / self.period)
            .map(|k| {
                let release = k * self.period + self.offset;
                let absolute_deadline = release + self.deadline;

                // first frame starting at or after the release, last frame ending by the deadline
                let first = release.div_ceil(frame_size) as usize;
                let end = ((absolute_deadline / frame_size) as usize).min(frame_count);

                Job::new(
                    JobId::new(self.task_id, k as ID),
                    release,
                    absolute_deadline,
                    self.wcet,
                    first.min(end)..end,
                )
            })
            .collect()
    }
}
