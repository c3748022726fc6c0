use log::debug;

use super::{Job, TaskSet, TimeStep};
use crate::utils::constants::MAX_FRAME_COUNT;
use crate::utils::{multiple_gcd, multiple_lcm, EngineConfig, InvalidTasksetError};

/// Frame size, major cycle and the jobs of one taskset.
///
/// Construction validates the taskset; every algorithm works from an already
/// validated model and never sees a malformed task.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingModel {
    major_cycle: TimeStep,  // LCM of all task periods
    frame_size: TimeStep,   // GCD of all task periods
    frame_count: usize,     // major_cycle / frame_size
    jobs: Vec<Job>,         // Ordered by task, then by instance
}

impl TimingModel {
    /// Builds the timing model of a taskset.
    ///
    /// # Arguments
    /// * `taskset` - The tasks to schedule.
    /// * `config` - Supplies the allowed period set.
    ///
    /// # Returns
    /// * `Result<Self, InvalidTasksetError>` - The model, or the first structural problem found.
    pub fn new(taskset: &TaskSet, config: &EngineConfig) -> Result<Self, InvalidTasksetError> {
        let allowed = &config.allowed_periods;
        if allowed.is_empty() || allowed.contains(&0) {
            return Err(InvalidTasksetError::EmptyPeriodSet);
        }

        taskset.validate(allowed)?;

        let periods = taskset.periods();
        let frame_size = multiple_gcd(&periods);
        let major_cycle = multiple_lcm(&periods)
            .filter(|&h| h / frame_size <= MAX_FRAME_COUNT)
            .ok_or_else(|| InvalidTasksetError::HorizonTooLarge {
                periods: periods.clone(),
                limit: MAX_FRAME_COUNT,
            })?;

        if let (Some(start), Some(end)) = (taskset.start_time(), taskset.end_time()) {
            if end <= start || (end - start) % major_cycle != 0 {
                return Err(InvalidTasksetError::HorizonMismatch { start, end, major_cycle });
            }
        }

        let jobs: Vec<Job> = taskset
            .iter()
            .flat_map(|task| task.spawn_jobs(major_cycle, frame_size))
            .collect();

        debug!(
            "timing model: major cycle {}, frame size {}, {} jobs",
            major_cycle,
            frame_size,
            jobs.len()
        );

        Ok(Self {
            major_cycle,
            frame_size,
            frame_count: (major_cycle / frame_size) as usize,
            jobs,
        })
    }

    pub fn major_cycle(&self) -> TimeStep {
        self.major_cycle
    }

    pub fn frame_size(&self) -> TimeStep {
        self.frame_size
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Start and end time of a frame.
    pub fn frame_bounds(&self, frame: usize) -> (TimeStep, TimeStep) {
        let start = frame as TimeStep * self.frame_size;
        (start, start + self.frame_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Task;

    #[test]
    fn test_single_task_model() {
        let taskset = TaskSet::new(vec![Task::new(1, 0, 4.0, 12, 12)]);
        let model = TimingModel::new(&taskset, &EngineConfig::default()).unwrap();

        assert_eq!(model.major_cycle(), 12);
        assert_eq!(model.frame_size(), 12);
        assert_eq!(model.frame_count(), 1);
        assert_eq!(model.jobs().len(), 1);
        assert_eq!(model.jobs()[0].eligible_frames(), 0..1);
    }

    #[test]
    fn test_generator_period_set() {
        let taskset = TaskSet::new(vec![
            Task::new(1, 0, 1.0, 6, 6),
            Task::new(2, 0, 2.0, 12, 12),
            Task::new(3, 0, 2.0, 18, 18),
            Task::new(4, 0, 2.0, 24, 24),
        ])
        .with_window(0, 72);
        let model = TimingModel::new(&taskset, &EngineConfig::default()).unwrap();

        assert_eq!(model.major_cycle(), 72);
        assert_eq!(model.frame_size(), 6);
        assert_eq!(model.frame_count(), 12);
        assert_eq!(model.jobs().len(), 12 + 6 + 4 + 3);
        assert_eq!(model.frame_bounds(3), (18, 24));
        for job in model.jobs() {
            for frame in job.eligible_frames() {
                let (start, end) = model.frame_bounds(frame);
                assert!(start >= job.release_time() && end <= job.absolute_deadline());
            }
        }
    }

    #[test]
    fn test_invalid_taskset_rejected() {
        let taskset = TaskSet::new(vec![Task::new(1, 0, 7.0, 6, 12)]);
        assert!(matches!(
            TimingModel::new(&taskset, &EngineConfig::default()),
            Err(InvalidTasksetError::WcetExceedsDeadline { .. })
        ));

        let empty_periods = EngineConfig::default().with_allowed_periods(vec![]);
        let taskset = TaskSet::new(vec![Task::new(1, 0, 1.0, 6, 6)]);
        assert_eq!(
            TimingModel::new(&taskset, &empty_periods),
            Err(InvalidTasksetError::EmptyPeriodSet)
        );
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let coprime = EngineConfig::default().with_allowed_periods(vec![4_294_967_311, 4_294_967_357]);
        let taskset = TaskSet::new(vec![
            Task::new(1, 0, 1.0, 4_294_967_311, 4_294_967_311),
            Task::new(2, 0, 1.0, 4_294_967_357, 4_294_967_357),
        ]);
        assert!(matches!(
            TimingModel::new(&taskset, &coprime),
            Err(InvalidTasksetError::HorizonTooLarge { .. })
        ));

        // no overflow, but far too many frames to allocate
        let spread = EngineConfig::default().with_allowed_periods(vec![1, 1_000_003]);
        let taskset = TaskSet::new(vec![
            Task::new(1, 0, 0.5, 1, 1),
            Task::new(2, 0, 1.0, 1_000_003, 1_000_003),
        ]);
        assert!(matches!(
            TimingModel::new(&taskset, &spread),
            Err(InvalidTasksetError::HorizonTooLarge { limit: MAX_FRAME_COUNT, .. })
        ));
    }

    #[test]
    fn test_horizon_mismatch() {
        let taskset = TaskSet::new(vec![Task::new(1, 0, 1.0, 12, 12)]).with_window(0, 18);
        assert!(matches!(
            TimingModel::new(&taskset, &EngineConfig::default()),
            Err(InvalidTasksetError::HorizonMismatch { major_cycle: 12, .. })
        ));

        let taskset = TaskSet::new(vec![Task::new(1, 0, 1.0, 12, 12)]).with_window(0, 72);
        assert!(TimingModel::new(&taskset, &EngineConfig::default()).is_ok());
    }
}
