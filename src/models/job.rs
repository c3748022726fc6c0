use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::{TimeStep, Work, ID};

/// Identifies a job as the `index`-th instance (0-based) of task `task_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JobId {
    pub task_id: ID,
    pub index: ID,
}

impl JobId {
    pub fn new(task_id: ID, index: ID) -> Self {
        Self { task_id, index }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}.{}", self.task_id, self.index)
    }
}

/// One instance of a task inside the major cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,                      // Task id and instance index
    release_time: TimeStep,         // k * period + offset
    absolute_deadline: TimeStep,    // release_time + relative deadline
    requirement: Work,              // Execution time the job needs
    eligible_frames: Range<usize>,  // Frames lying inside [release_time, absolute_deadline)
}

impl Job {
    pub fn new(
        id: JobId,
        release_time: TimeStep,
        absolute_deadline: TimeStep,
        requirement: Work,
        eligible_frames: Range<usize>,
    ) -> Self {
        Self {
            id,
            release_time,
            absolute_deadline,
            requirement,
            eligible_frames,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn task_id(&self) -> ID {
        self.id.task_id
    }

    pub fn release_time(&self) -> TimeStep {
        self.release_time
    }

    pub fn absolute_deadline(&self) -> TimeStep {
        self.absolute_deadline
    }

    pub fn requirement(&self) -> Work {
        self.requirement
    }

    pub fn eligible_frames(&self) -> Range<usize> {
        self.eligible_frames.clone()
    }

    pub fn is_eligible(&self, frame: usize) -> bool {
        self.eligible_frames.contains(&frame)
    }
}
