use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::utils::{EngineConfig, LoadError};
use crate::{Task, TaskSet, TimeStep, Work, ID};

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, LoadError> {
    value.trim().parse().map_err(|_| LoadError::Field {
        field,
        value: value.to_string(),
    })
}

/// Reads a taskset file.
///
/// `.json` files follow the generator contract (`startTime`, `endTime`, `taskset`);
/// anything else is read as headerless CSV with one `offset, wcet, deadline, period`
/// line per task, ids numbered from 1.
pub fn read_task_file(path: &Path) -> Result<TaskSet, LoadError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        return read_json_taskset(path);
    }
    read_csv_taskset(path)
}

pub fn read_json_taskset(path: &Path) -> Result<TaskSet, LoadError> {
    Ok(serde_json::from_str(&read_to_string(path)?)?)
}

pub fn read_csv_taskset(path: &Path) -> Result<TaskSet, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut tasks = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let offset: TimeStep = parse_field("offset", field(0))?;
        let wcet: Work = parse_field("wcet", field(1))?;
        let deadline: TimeStep = parse_field("deadline", field(2))?;
        let period: TimeStep = parse_field("period", field(3))?;

        tasks.push(Task::new(index as ID + 1, offset, wcet, deadline, period));
    }

    Ok(TaskSet::new(tasks))
}

/// Reads every `.json` taskset of a directory, sorted by file name.
pub fn read_task_dir(dir: &Path) -> Result<Vec<(String, TaskSet)>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = path.display().to_string();
            read_json_taskset(&path).map(|taskset| (name, taskset))
        })
        .collect()
}

/// Reads an [`EngineConfig`] from a JSON file.
pub fn read_config_file(path: &Path) -> Result<EngineConfig, LoadError> {
    Ok(serde_json::from_str(&read_to_string(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cyclic_frames_{}_{}", std::process::id(), name));
        fs::write(&path, content).expect("Unable to write test file");
        path
    }

    #[test]
    fn test_read_csv_task_file() {
        let path = scratch("tasks.csv", "0, 2.5, 6, 6\n0, 3, 12, 12");

        let taskset = read_task_file(&path).expect("Failed to read task set");
        let task = &taskset.get_tasks()[0];

        assert_eq!(taskset.len(), 2);
        assert_eq!(task.id(), 1);
        assert_eq!(task.offset(), 0);
        assert_eq!(task.wcet(), 2.5);
        assert_eq!(task.deadline(), 6);
        assert_eq!(taskset.get_tasks()[1].period(), 12);

        fs::remove_file(path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_read_csv_invalid_format() {
        let path = scratch("invalid.csv", "Invalid, Data");
        assert!(read_task_file(&path).is_err());
        fs::remove_file(path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_read_json_task_file() {
        let path = scratch(
            "tasks.json",
            r#"{"startTime": 0, "endTime": 72, "taskset": [{"taskId": 7, "period": 24, "wcet": 5.5, "deadline": 24, "offset": 0}]}"#,
        );

        let taskset = read_task_file(&path).unwrap();
        assert_eq!(taskset.get_tasks()[0].id(), 7);
        assert_eq!(taskset.end_time(), Some(72));

        fs::remove_file(path).expect("Failed to clean up test file");
    }

    #[test]
    fn test_missing_file() {
        let result = read_task_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_read_config_file() {
        let path = scratch("config.json", r#"{"allowed_periods": [4, 8], "solver_node_limit": 1000}"#);

        let config = read_config_file(&path).unwrap();
        assert_eq!(config.allowed_periods, vec![4, 8]);
        assert_eq!(config.solver_node_limit, Some(1000));

        fs::remove_file(path).expect("Failed to clean up test file");
    }
}
