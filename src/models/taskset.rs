use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Task, TimeStep};
use crate::utils::InvalidTasksetError;

/// The engine input: a list of tasks plus the time window they were generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSet {
    #[serde(default)]
    start_time: Option<TimeStep>,
    #[serde(default)]
    end_time: Option<TimeStep>,
    #[serde(rename = "taskset")]
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            start_time: None,
            end_time: None,
            tasks,
        }
    }

    pub fn with_window(mut self, start_time: TimeStep, end_time: TimeStep) -> Self {
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self
    }

    pub fn get_tasks(&self) -> &Vec<Task> {
        &self.tasks
    }

    pub fn start_time(&self) -> Option<TimeStep> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<TimeStep> {
        self.end_time
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn utilisation(&self) -> f64 {
        self.tasks.iter().map(|t| t.utilisation()).sum()
    }

    pub fn periods(&self) -> Vec<TimeStep> {
        self.tasks.iter().map(|t| t.period()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Validates every task and the uniqueness of task ids.
    pub fn validate(&self, allowed_periods: &[TimeStep]) -> Result<(), InvalidTasksetError> {
        if self.tasks.is_empty() {
            return Err(InvalidTasksetError::EmptyTaskSet);
        }

        let mut seen = HashSet::new();
        for task in self.tasks.iter() {
            if !seen.insert(task.id()) {
                return Err(InvalidTasksetError::DuplicateTaskId { task: task.id() });
            }
            task.validate(allowed_periods)?;
        }

        Ok(())
    }
}
