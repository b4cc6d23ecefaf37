//! Per-process task bookkeeping for one scheduling run.
//!
//! A [`ProcessState`] tracks the active tasks a member already runs and
//! the standbys handed to it during the run. [`ClusterState`] owns one
//! entry per member and is the only mutable state the run touches.

use std::collections::{BTreeMap, BTreeSet};

use standby_core::{ClusterSnapshot, ProcessId, TaskId};

use crate::error::{AssignError, AssignResult};
use crate::validate::validate_snapshot;

/// Ordering key for candidate selection: number of assigned tasks.
pub type Load = u32;

/// Tasks held by a single process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessState {
    id: ProcessId,
    active: BTreeSet<TaskId>,
    standby: BTreeSet<TaskId>,
    max_tasks: Option<u32>,
}

impl ProcessState {
    pub fn new(id: ProcessId, active: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            id,
            active: active.into_iter().collect(),
            standby: BTreeSet::new(),
            max_tasks: None,
        }
    }

    pub fn with_max_tasks(mut self, max_tasks: Option<u32>) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    pub fn active_tasks(&self) -> &BTreeSet<TaskId> {
        &self.active
    }

    pub fn standby_tasks(&self) -> &BTreeSet<TaskId> {
        &self.standby
    }

    pub fn max_tasks(&self) -> Option<u32> {
        self.max_tasks
    }

    /// True if the process holds `task` as active or standby.
    pub fn has_task(&self, task: &TaskId) -> bool {
        self.active.contains(task) || self.standby.contains(task)
    }

    pub fn load(&self) -> Load {
        (self.active.len() + self.standby.len()) as Load
    }

    /// True once the load has reached the configured task limit.
    pub fn is_full(&self) -> bool {
        self.max_tasks.is_some_and(|max| self.load() >= max)
    }

    /// Add a standby replica of `task`.
    ///
    /// The caller must have checked [`has_task`](Self::has_task); holding
    /// the task already is a contract violation and is returned as an error.
    pub fn assign_standby(&mut self, task: TaskId) -> AssignResult<()> {
        if self.has_task(&task) {
            return Err(AssignError::TaskAlreadyAssigned {
                process: self.id.clone(),
                task,
            });
        }
        self.standby.insert(task);
        Ok(())
    }
}

/// All process states for a run, keyed by process id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterState {
    processes: BTreeMap<ProcessId, ProcessState>,
}

impl ClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `snapshot` and seed one state per process.
    ///
    /// A process without its own `max_tasks` inherits `default_max_tasks`.
    pub fn from_snapshot(
        snapshot: &ClusterSnapshot,
        default_max_tasks: Option<u32>,
    ) -> AssignResult<Self> {
        validate_snapshot(snapshot)?;

        let mut cluster = Self::new();
        for process in &snapshot.processes {
            let state = ProcessState::new(process.id.clone(), process.active_tasks.iter().copied())
                .with_max_tasks(process.max_tasks.or(default_max_tasks));
            cluster.insert(state)?;
        }
        Ok(cluster)
    }

    pub fn insert(&mut self, state: ProcessState) -> AssignResult<()> {
        if self.processes.contains_key(state.id()) {
            return Err(AssignError::DuplicateProcess(state.id().clone()));
        }
        self.processes.insert(state.id().clone(), state);
        Ok(())
    }

    pub fn get(&self, process: &ProcessId) -> Option<&ProcessState> {
        self.processes.get(process)
    }

    pub fn process_ids(&self) -> impl Iterator<Item = &ProcessId> {
        self.processes.keys()
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessState> {
        self.processes.values()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Unknown processes hold nothing.
    pub fn has_task(&self, process: &ProcessId, task: &TaskId) -> bool {
        self.get(process).is_some_and(|p| p.has_task(task))
    }

    pub fn load(&self, process: &ProcessId) -> Option<Load> {
        self.get(process).map(ProcessState::load)
    }

    pub fn assign_standby(&mut self, process: &ProcessId, task: TaskId) -> AssignResult<()> {
        self.processes
            .get_mut(process)
            .ok_or_else(|| AssignError::UnknownProcess(process.clone()))?
            .assign_standby(task)
    }

    /// Constraint predicate for standby selection.
    ///
    /// Unknown processes, processes already holding `task`, and processes
    /// at their task limit are ineligible.
    pub fn is_ineligible_for_standby(&self, process: &ProcessId, task: &TaskId) -> bool {
        match self.get(process) {
            Some(state) => state.has_task(task) || state.is_full(),
            None => true,
        }
    }

    /// Ordering key for standby selection. Unknown processes sort last.
    pub fn assigned_load(&self, process: &ProcessId) -> Load {
        self.load(process).unwrap_or(Load::MAX)
    }

    /// Every process that holds `task` as standby.
    pub fn standby_holders(&self, task: &TaskId) -> Vec<ProcessId> {
        self.processes()
            .filter(|p| p.standby_tasks().contains(task))
            .map(|p| p.id().clone())
            .collect()
    }

    pub fn standby_assignment(&self) -> BTreeMap<ProcessId, BTreeSet<TaskId>> {
        self.processes()
            .map(|p| (p.id().clone(), p.standby_tasks().clone()))
            .collect()
    }

    pub fn loads(&self) -> BTreeMap<ProcessId, Load> {
        self.processes()
            .map(|p| (p.id().clone(), p.load()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use standby_core::ProcessSnapshot;

    fn t(subtopology: u32, partition: u32) -> TaskId {
        TaskId::new(subtopology, partition)
    }

    fn make_process(id: &str, active: &[TaskId]) -> ProcessState {
        ProcessState::new(ProcessId::new(id), active.iter().copied())
    }

    #[test]
    fn load_counts_active_and_standby() {
        let mut p = make_process("p1", &[t(0, 0), t(0, 1)]);
        assert_eq!(p.load(), 2);

        p.assign_standby(t(1, 0)).unwrap();
        assert_eq!(p.load(), 3);
        assert!(p.standby_tasks().contains(&t(1, 0)));
    }

    #[test]
    fn has_task_covers_both_roles() {
        let mut p = make_process("p1", &[t(0, 0)]);
        p.assign_standby(t(0, 1)).unwrap();

        assert!(p.has_task(&t(0, 0)));
        assert!(p.has_task(&t(0, 1)));
        assert!(!p.has_task(&t(0, 2)));
    }

    #[test]
    fn standby_of_own_active_is_rejected() {
        let mut p = make_process("p1", &[t(0, 0)]);
        let err = p.assign_standby(t(0, 0)).unwrap_err();

        assert_eq!(
            err,
            AssignError::TaskAlreadyAssigned {
                process: ProcessId::new("p1"),
                task: t(0, 0),
            }
        );
        assert!(p.standby_tasks().is_empty());
    }

    #[test]
    fn duplicate_standby_is_rejected() {
        let mut p = make_process("p1", &[]);
        p.assign_standby(t(0, 0)).unwrap();
        assert!(p.assign_standby(t(0, 0)).is_err());
        assert_eq!(p.load(), 1);
    }

    #[test]
    fn full_once_limit_reached() {
        let mut p = make_process("p1", &[t(0, 0)]).with_max_tasks(Some(2));
        assert!(!p.is_full());
        p.assign_standby(t(0, 1)).unwrap();
        assert!(p.is_full());

        let unlimited = make_process("p2", &[t(0, 0), t(0, 1), t(0, 2)]);
        assert!(!unlimited.is_full());
    }

    #[test]
    fn cluster_seeds_from_snapshot_with_default_limit() {
        let snapshot = ClusterSnapshot {
            processes: vec![
                ProcessSnapshot::new("p1", [t(0, 0)]),
                ProcessSnapshot::new("p2", [t(0, 1)]).with_max_tasks(5),
            ],
            stateful_tasks: [t(0, 0)].into(),
        };
        let cluster = ClusterState::from_snapshot(&snapshot, Some(3)).unwrap();

        assert_eq!(cluster.len(), 2);
        assert_eq!(cluster.get(&"p1".into()).unwrap().max_tasks(), Some(3));
        assert_eq!(cluster.get(&"p2".into()).unwrap().max_tasks(), Some(5));
        assert_eq!(cluster.load(&"p1".into()), Some(1));
    }

    #[test]
    fn insert_rejects_duplicate_process() {
        let mut cluster = ClusterState::new();
        cluster.insert(make_process("p1", &[])).unwrap();
        let err = cluster.insert(make_process("p1", &[t(0, 0)])).unwrap_err();
        assert_eq!(err, AssignError::DuplicateProcess("p1".into()));
    }

    #[test]
    fn unknown_process_is_ineligible_and_unassignable() {
        let mut cluster = ClusterState::new();
        cluster.insert(make_process("p1", &[])).unwrap();
        let ghost = ProcessId::new("ghost");

        assert!(cluster.is_ineligible_for_standby(&ghost, &t(0, 0)));
        assert!(!cluster.is_ineligible_for_standby(&"p1".into(), &t(0, 0)));
        assert_eq!(cluster.assigned_load(&ghost), Load::MAX);
        assert_eq!(
            cluster.assign_standby(&ghost, t(0, 0)),
            Err(AssignError::UnknownProcess(ghost))
        );
    }

    #[test]
    fn standby_holders_and_assignment_reflect_mutations() {
        let mut cluster = ClusterState::new();
        cluster.insert(make_process("p1", &[t(0, 0)])).unwrap();
        cluster.insert(make_process("p2", &[])).unwrap();
        cluster.insert(make_process("p3", &[])).unwrap();

        cluster.assign_standby(&"p2".into(), t(0, 0)).unwrap();
        cluster.assign_standby(&"p3".into(), t(0, 0)).unwrap();

        assert_eq!(cluster.standby_holders(&t(0, 0)), vec![ProcessId::new("p2"), ProcessId::new("p3")]);
        let assignment = cluster.standby_assignment();
        assert!(assignment[&ProcessId::new("p1")].is_empty());
        assert_eq!(assignment[&ProcessId::new("p2")].len(), 1);
        assert_eq!(cluster.loads()[&ProcessId::new("p3")], 1);
    }
}
