pub mod flow_scheduler;
pub mod ilp_scheduler;
pub mod repair;
pub mod scheduler;

pub use flow_scheduler::{FlowSchedule, JobService, NetworkFlowScheduler, RepairOutcome};
pub use ilp_scheduler::{AssignmentModel, IlpSchedule, IlpScheduler};
pub use repair::{best_fit_descending, Relocation, RepairFailure};
pub use scheduler::{Outcome, Scheduler};

#[cfg(test)]
mod properties;
