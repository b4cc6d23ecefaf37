//! Snapshot checks run before any assignment is made.
//!
//! Malformed snapshots are rejected rather than partially scheduled:
//! - a process id listed twice
//! - a task active on more than one process
//! - a stateful task that no process runs as active
//!
//! Active tasks missing from `stateful_tasks` are fine. They add load but
//! never receive standbys.

use std::collections::{BTreeMap, BTreeSet};

use standby_core::{ClusterSnapshot, ProcessId, TaskId};

use crate::error::{AssignError, AssignResult};

pub fn validate_snapshot(snapshot: &ClusterSnapshot) -> AssignResult<()> {
    let mut seen: BTreeSet<&ProcessId> = BTreeSet::new();
    let mut owners: BTreeMap<TaskId, &ProcessId> = BTreeMap::new();

    for process in &snapshot.processes {
        if !seen.insert(&process.id) {
            return Err(AssignError::DuplicateProcess(process.id.clone()));
        }
        for task in &process.active_tasks {
            if let Some(first) = owners.insert(*task, &process.id) {
                return Err(AssignError::DuplicateActiveTask {
                    task: *task,
                    first: first.clone(),
                    second: process.id.clone(),
                });
            }
        }
    }

    if let Some(task) = snapshot
        .stateful_tasks
        .iter()
        .find(|task| !owners.contains_key(*task))
    {
        return Err(AssignError::UnownedStatefulTask(*task));
    }

    Ok(())
}
