use crate::TimeStep;

/// Tolerance used whenever two execution amounts are compared.
pub const EPSILON: f64 = 1e-9;

/// Periods produced by the taskset generator. Frame size derivation relies on
/// every period of a taskset coming from this set.
pub const DEFAULT_PERIODS: [TimeStep; 4] = [6, 12, 18, 24];

/// Largest number of frames a major cycle may be split into.
pub const MAX_FRAME_COUNT: u64 = 1 << 16;

/// Default wall-clock budget handed to the ILP solver, in milliseconds.
pub const DEFAULT_SOLVER_TIME_LIMIT_MS: u64 = 60_000;

/// Process exit codes reported by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentCode {
    Feasible = 0,
    PartialService = 1,
    RepairFailure = 2,
    Infeasible = 3,
    SolverError = 4,
    InvalidTaskset = 5,
}

/// Which construction to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    NetworkFlow,
    Ilp,
    Both,
}

impl Algorithm {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "flow" => Some(Algorithm::NetworkFlow),
            "ilp" => Some(Algorithm::Ilp),
            "both" => Some(Algorithm::Both),
            _ => None,
        }
    }

    pub fn runs_flow(&self) -> bool {
        matches!(self, Algorithm::NetworkFlow | Algorithm::Both)
    }

    pub fn runs_ilp(&self) -> bool {
        matches!(self, Algorithm::Ilp | Algorithm::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(Algorithm::parse("flow"), Some(Algorithm::NetworkFlow));
        assert_eq!(Algorithm::parse("ilp"), Some(Algorithm::Ilp));
        assert_eq!(Algorithm::parse("both"), Some(Algorithm::Both));
        assert_eq!(Algorithm::parse("edf"), None);
        assert!(Algorithm::Both.runs_flow() && Algorithm::Both.runs_ilp());
        assert!(!Algorithm::Ilp.runs_flow());
    }
}
