pub mod assignment;
pub mod frame;
mod job;
pub mod scheduler;
pub mod task;
pub mod taskset;
pub mod timing;

pub use assignment::{Allocation, Assignment, FrameInterval, JobAssignment};
pub use frame::FrameTable;
pub use job::{Job, JobId};
pub use task::Task;
pub use taskset::TaskSet;
pub use timing::TimingModel;

/// Integral points in time: periods, deadlines, offsets and frame bounds.
pub type TimeStep = u64;

/// Execution time, real valued.
pub type Work = f64;

pub type ID = u32;
