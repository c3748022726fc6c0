//! 0-1 integer programming: model representation and the solver capability.

pub mod branch_bound;
pub mod model;
pub mod solver;

pub use branch_bound::BranchAndBound;
pub use model::{IlpModel, LinearConstraint, Relation, VarId};
pub use solver::{IlpSolver, SolverStatus};
