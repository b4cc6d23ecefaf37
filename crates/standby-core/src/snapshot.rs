//! Cluster snapshot consumed by one scheduling run.
//!
//! Produced by the active-task assignor: which process runs which tasks
//! as active, plus the set of tasks whose state needs standby replicas.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{ProcessId, TaskId};

/// Active assignment of one cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    #[serde(default)]
    pub active_tasks: BTreeSet<TaskId>,
    /// Upper bound on total assigned tasks. Overrides the config default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tasks: Option<u32>,
}

impl ProcessSnapshot {
    pub fn new(id: impl Into<String>, active_tasks: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            id: ProcessId::new(id),
            active_tasks: active_tasks.into_iter().collect(),
            max_tasks: None,
        }
    }

    pub fn with_max_tasks(mut self, max_tasks: u32) -> Self {
        self.max_tasks = Some(max_tasks);
        self
    }
}

/// Immutable input to a scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub processes: Vec<ProcessSnapshot>,
    #[serde(default)]
    pub stateful_tasks: BTreeSet<TaskId>,
}

impl ClusterSnapshot {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Every task that some process holds as active.
    pub fn active_tasks(&self) -> BTreeSet<TaskId> {
        self.processes
            .iter()
            .flat_map(|p| p.active_tasks.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_snapshot() {
        let json = r#"{
            "processes": [
                { "id": "p1", "active_tasks": ["0_0", "0_1"] },
                { "id": "p2", "max_tasks": 4 }
            ],
            "stateful_tasks": ["0_0"]
        }"#;
        let snapshot = ClusterSnapshot::from_json_str(json).unwrap();

        assert_eq!(snapshot.processes.len(), 2);
        assert_eq!(snapshot.processes[0].active_tasks.len(), 2);
        assert!(snapshot.processes[1].active_tasks.is_empty());
        assert_eq!(snapshot.processes[1].max_tasks, Some(4));
        assert!(snapshot.stateful_tasks.contains(&TaskId::new(0, 0)));
    }

    #[test]
    fn rejects_bad_task_id() {
        let json = r#"{ "processes": [ { "id": "p1", "active_tasks": ["zero"] } ] }"#;
        assert!(ClusterSnapshot::from_json_str(json).is_err());
    }

    #[test]
    fn rejects_non_canonical_task_id_spellings() {
        // "0_3" and "00_03" would otherwise collapse into one set entry.
        let json = r#"{ "processes": [ { "id": "p1", "active_tasks": ["0_3", "00_03"] } ] }"#;
        assert!(ClusterSnapshot::from_json_str(json).is_err());
    }

    #[test]
    fn collects_active_tasks_across_processes() {
        let snapshot = ClusterSnapshot {
            processes: vec![
                ProcessSnapshot::new("p1", [TaskId::new(0, 0)]),
                ProcessSnapshot::new("p2", [TaskId::new(0, 1), TaskId::new(1, 0)]),
            ],
            stateful_tasks: BTreeSet::new(),
        };
        assert_eq!(snapshot.active_tasks().len(), 3);
    }
}
