use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{DEFAULT_PERIODS, DEFAULT_SOLVER_TIME_LIMIT_MS};
use crate::TimeStep;

/// Engine-wide settings shared by every assignment run.
///
/// Missing fields fall back to their defaults, so an empty JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub allowed_periods: Vec<TimeStep>,     // Periods a task may declare
    pub solver_time_limit_ms: Option<u64>,  // `None` lets the ILP solver run unbounded
    pub solver_node_limit: Option<u64>,     // Cap on explored branch-and-bound nodes
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_periods: DEFAULT_PERIODS.to_vec(),
            solver_time_limit_ms: Some(DEFAULT_SOLVER_TIME_LIMIT_MS),
            solver_node_limit: None,
        }
    }
}

impl EngineConfig {
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.solver_time_limit_ms = limit.map(|l| l.as_millis() as u64);
        self
    }

    pub fn with_allowed_periods(mut self, periods: Vec<TimeStep>) -> Self {
        self.allowed_periods = periods;
        self
    }

    pub fn solver_time_limit(&self) -> Option<Duration> {
        self.solver_time_limit_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.allowed_periods, vec![6, 12, 18, 24]);
        assert_eq!(config.solver_time_limit(), Some(Duration::from_secs(60)));
        assert_eq!(config.solver_node_limit, None);
    }

    #[test]
    fn test_partial_json_config() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "allowed_periods": [5, 10], "solver_time_limit_ms": null }"#).unwrap();
        assert_eq!(config.allowed_periods, vec![5, 10]);
        assert_eq!(config.solver_time_limit(), None);

        let empty: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }
}
