//! Least-loaded candidate selection under a per-task constraint.
//!
//! The pool is kept ordered by `(load, process id)`, so the scan in
//! [`ConstrainedCandidateSelector::poll`] visits candidates from least to
//! most loaded and breaks ties by ascending process id. Eligibility is
//! checked per poll, which lets one pool serve every task in a run.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use standby_core::{ProcessId, TaskId};

use crate::process_state::{ClusterState, Load};

/// A pool of processes ordered by load and filtered by a constraint.
///
/// `ineligible` and `load_of` are fixed at construction and read the
/// caller's state `S`, which is passed to every call. That keeps the
/// selector free of borrows on state the caller mutates between polls.
pub struct ConstrainedCandidateSelector<S, I, L> {
    pool: BTreeSet<(Load, ProcessId)>,
    /// Load each pooled process was queued with.
    queued: BTreeMap<ProcessId, Load>,
    ineligible: I,
    load_of: L,
    _state: PhantomData<fn(&S)>,
}

impl<S, I, L> ConstrainedCandidateSelector<S, I, L>
where
    I: Fn(&S, &ProcessId, &TaskId) -> bool,
    L: Fn(&S, &ProcessId) -> Load,
{
    pub fn new(ineligible: I, load_of: L) -> Self {
        Self {
            pool: BTreeSet::new(),
            queued: BTreeMap::new(),
            ineligible,
            load_of,
            _state: PhantomData,
        }
    }

    /// Remove and return the least-loaded process eligible for `task`.
    ///
    /// Returns `None` when every pooled process is ineligible. Ineligible
    /// processes stay in the pool.
    pub fn poll(&mut self, state: &S, task: &TaskId) -> Option<ProcessId> {
        let ineligible = &self.ineligible;
        let entry = self
            .pool
            .iter()
            .find(|(_, process)| !ineligible(state, process, task))
            .cloned()?;

        self.pool.remove(&entry);
        self.queued.remove(&entry.1);
        Some(entry.1)
    }

    /// Put `process` (back) into the pool at its current load.
    ///
    /// Offering a process that is already pooled re-queues it, so a stale
    /// load is never used for ordering.
    pub fn offer(&mut self, state: &S, process: ProcessId) {
        if let Some(stale) = self.queued.remove(&process) {
            self.pool.remove(&(stale, process.clone()));
        }
        let load = (self.load_of)(state, &process);
        self.queued.insert(process.clone(), load);
        self.pool.insert((load, process));
    }

    pub fn offer_all(&mut self, state: &S, processes: impl IntoIterator<Item = ProcessId>) {
        for process in processes {
            self.offer(state, process);
        }
    }

    pub fn contains(&self, process: &ProcessId) -> bool {
        self.queued.contains_key(process)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

type StandbyIneligible = fn(&ClusterState, &ProcessId, &TaskId) -> bool;
type StandbyLoad = fn(&ClusterState, &ProcessId) -> Load;

/// The selector used for standby assignment.
pub type StandbySelector = ConstrainedCandidateSelector<ClusterState, StandbyIneligible, StandbyLoad>;

/// Build an empty selector that orders by assigned task count and skips
/// processes that already hold the task (or are at their task limit).
pub fn least_loaded_constrained_by_assigned_task() -> StandbySelector {
    ConstrainedCandidateSelector::new(
        ClusterState::is_ineligible_for_standby as StandbyIneligible,
        ClusterState::assigned_load as StandbyLoad,
    )
}
