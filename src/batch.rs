//! Aggregation of many assignment runs, one summary per scheduler.

use std::thread;

use log::{debug, warn};
use serde::Serialize;

use crate::core::{run_on, RunRecord};
use crate::models::scheduler::Scheduler;
use crate::utils::EngineConfig;
use crate::{TaskSet, TimingModel};

/// Success statistics of one scheduler over a batch of tasksets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    #[serde(rename = "Scheduler")]
    pub scheduler: String,
    #[serde(rename = "nTaskSets")]
    pub n_task_sets: usize,
    #[serde(rename = "successCount")]
    pub success_count: usize,
    pub utilization: f64,
    #[serde(rename = "nTasks")]
    pub n_tasks: usize,
    #[serde(rename = "totalTime")]
    pub total_time: f64, // Seconds, summed over successful runs only
}

impl BatchSummary {
    pub fn new(scheduler: &str, utilization: f64, n_tasks: usize) -> Self {
        Self {
            scheduler: scheduler.to_string(),
            n_task_sets: 0,
            success_count: 0,
            utilization,
            n_tasks,
            total_time: 0.0,
        }
    }

    /// Counts one run.
    pub fn record(&mut self, record: &RunRecord) {
        self.n_task_sets += 1;
        if record.is_feasible() {
            self.success_count += 1;
            self.total_time += record.elapsed.as_secs_f64();
        }
    }

    /// Counts a taskset rejected before any algorithm ran.
    pub fn record_rejected(&mut self) {
        self.n_task_sets += 1;
    }

    fn merge(&mut self, other: &BatchSummary) {
        self.n_task_sets += other.n_task_sets;
        self.success_count += other.success_count;
        self.total_time += other.total_time;
    }
}

/// Runs every scheduler on every taskset, spreading tasksets over `workers` threads.
///
/// Each run builds its own timing model, network and solver state; threads share
/// nothing but the read-only inputs.
///
/// # Arguments
/// * `schedulers` - The constructions to compare.
/// * `tasksets` - The batch.
/// * `config` - Engine settings used to validate every taskset.
/// * `utilization` - Target utilization the batch was generated for, reported as is.
/// * `workers` - Number of threads, at least one is used.
///
/// # Returns
/// * `Vec<BatchSummary>` - One summary per scheduler, in the order given.
pub fn run_batch(
    schedulers: &[&dyn Scheduler],
    tasksets: &[TaskSet],
    config: &EngineConfig,
    utilization: f64,
    workers: usize,
) -> Vec<BatchSummary> {
    let n_tasks = tasksets.iter().map(|t| t.len()).max().unwrap_or(0);
    let mut totals: Vec<BatchSummary> = schedulers
        .iter()
        .map(|s| BatchSummary::new(s.name(), utilization, n_tasks))
        .collect();

    if tasksets.is_empty() {
        return totals;
    }

    let chunk_size = tasksets.len().div_ceil(workers.max(1));
    debug!("batch of {} tasksets, {} per worker", tasksets.len(), chunk_size);

    let partials: Vec<Vec<BatchSummary>> = thread::scope(|scope| {
        let handles: Vec<_> = tasksets
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || run_chunk(schedulers, chunk, config, utilization, n_tasks)))
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(partial) => Some(partial),
                Err(_) => {
                    warn!("a batch worker panicked, its tasksets are not counted");
                    None
                }
            })
            .collect()
    });

    for partial in partials.iter() {
        for (total, part) in totals.iter_mut().zip(partial) {
            total.merge(part);
        }
    }

    totals
}

fn run_chunk(
    schedulers: &[&dyn Scheduler],
    tasksets: &[TaskSet],
    config: &EngineConfig,
    utilization: f64,
    n_tasks: usize,
) -> Vec<BatchSummary> {
    let mut summaries: Vec<BatchSummary> = schedulers
        .iter()
        .map(|s| BatchSummary::new(s.name(), utilization, n_tasks))
        .collect();

    for taskset in tasksets {
        match TimingModel::new(taskset, config) {
            Ok(timing) => {
                for (scheduler, summary) in schedulers.iter().zip(summaries.iter_mut()) {
                    summary.record(&run_on(*scheduler, &timing));
                }
            }
            Err(error) => {
                warn!("taskset rejected: {}", error);
                summaries.iter_mut().for_each(|s| s.record_rejected());
            }
        }
    }

    summaries
}
