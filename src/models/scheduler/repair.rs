use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{FrameTable, Job, JobId, Work};

/// A preempted job moved whole into a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Relocation {
    pub job: JobId,
    pub frame: usize,
    pub time: Work,
}

/// The first preempted job best-fit-descending could not place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairFailure {
    pub job: JobId,                  // Job left without a frame
    pub requirement: Work,           // Its full execution requirement
    pub placed: Vec<Relocation>,     // Jobs relocated before the failure
    pub abandoned: Vec<JobId>,       // Jobs never attempted once the failure was known
}

/// Re-packs preempted jobs, each wholly into one frame.
///
/// Jobs are taken by decreasing requirement (ties by job id). Each goes to the
/// eligible frame with the smallest remaining capacity that still holds its full
/// requirement, the lowest frame index winning ties. The first job that fits
/// nowhere stops the pass.
///
/// # Arguments
/// * `jobs` - Every job of the timing model.
/// * `preempted` - Indices into `jobs` of the jobs to re-pack.
/// * `frames` - Remaining capacities, already charged with the unpreempted jobs.
///
/// # Returns
/// * `Result<Vec<Relocation>, RepairFailure>` - The placement, in packing order.
pub fn best_fit_descending(
    jobs: &[Job],
    preempted: &[usize],
    frames: &mut FrameTable,
) -> Result<Vec<Relocation>, RepairFailure> {
    let mut order: Vec<&Job> = preempted.iter().map(|&i| &jobs[i]).collect();
    order.sort_by(|a, b| match b.requirement().total_cmp(&a.requirement()) {
        Ordering::Equal => a.id().cmp(&b.id()),
        other => other,
    });

    let mut placed = Vec::with_capacity(order.len());

    for (position, job) in order.iter().enumerate() {
        let mut best_frame: Option<usize> = None;
        let mut min_slack = Work::MAX;

        for frame in job.eligible_frames().filter(|&f| f < frames.frame_count()) {
            let slack = frames.remaining(frame);
            if frames.fits(frame, job.requirement()) && slack < min_slack {
                best_frame = Some(frame);
                min_slack = slack;
            }
        }

        match best_frame {
            Some(frame) => {
                frames.commit(frame, job.requirement());
                placed.push(Relocation {
                    job: job.id(),
                    frame,
                    time: job.requirement(),
                });
            }
            None => {
                return Err(RepairFailure {
                    job: job.id(),
                    requirement: job.requirement(),
                    placed,
                    abandoned: order[position + 1..].iter().map(|j| j.id()).collect(),
                });
            }
        }
    }

    Ok(placed)
}
