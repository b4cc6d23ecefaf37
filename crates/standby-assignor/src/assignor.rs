//! Standby assignment: spread standby replicas over the least-loaded
//! eligible processes.
//!
//! For every stateful task the assignor repeatedly polls the selector for
//! the least-loaded process that does not already hold the task, hands it
//! a standby, and offers it back at its new load. When no eligible process
//! is left the task is recorded as a [`Shortfall`] and the run moves on.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use standby_core::{AssignorConfig, ClusterSnapshot, ProcessId, Shortfall, TaskId};
use tracing::{debug, info, warn};

use crate::error::AssignResult;
use crate::process_state::{ClusterState, Load};
use crate::selector::{ConstrainedCandidateSelector, least_loaded_constrained_by_assigned_task};

/// Outcome of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandbyPlan {
    /// Standby tasks per process, including processes that received none.
    pub standby_tasks: BTreeMap<ProcessId, BTreeSet<TaskId>>,
    /// Active + standby count per process after the run.
    pub loads: BTreeMap<ProcessId, Load>,
    /// Standbys still missing per stateful task.
    pub remaining: BTreeMap<TaskId, u32>,
    /// Under-replicated tasks, in scheduling order.
    pub shortfalls: Vec<Shortfall>,
}

impl StandbyPlan {
    fn new(cluster: &ClusterState, remaining: BTreeMap<TaskId, u32>, shortfalls: Vec<Shortfall>) -> Self {
        Self {
            standby_tasks: cluster.standby_assignment(),
            loads: cluster.loads(),
            remaining,
            shortfalls,
        }
    }

    pub fn standbys_for(&self, process: &ProcessId) -> Option<&BTreeSet<TaskId>> {
        self.standby_tasks.get(process)
    }

    /// Processes holding a standby of `task`, in process id order.
    pub fn holders_of(&self, task: &TaskId) -> Vec<&ProcessId> {
        self.standby_tasks
            .iter()
            .filter(|(_, tasks)| tasks.contains(task))
            .map(|(process, _)| process)
            .collect()
    }

    pub fn total_standbys(&self) -> usize {
        self.standby_tasks.values().map(BTreeSet::len).sum()
    }

    pub fn is_fully_replicated(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Seed the remaining-standby count of every stateful task.
pub fn compute_remaining_standbys(
    num_standby_replicas: u32,
    stateful_tasks: &BTreeSet<TaskId>,
) -> BTreeMap<TaskId, u32> {
    stateful_tasks
        .iter()
        .map(|task| (*task, num_standby_replicas))
        .collect()
}

/// Assign standbys of `task` until its remaining count hits zero or no
/// eligible process is left.
///
/// Each assigned process is offered back to `selector` right away, so the
/// next poll sees its increased load. A task missing from `remaining`
/// needs no standbys. Returns the shortfall if the target was not met.
pub fn assign_standbys_for_task<I, L>(
    num_standby_replicas: u32,
    cluster: &mut ClusterState,
    remaining: &mut BTreeMap<TaskId, u32>,
    selector: &mut ConstrainedCandidateSelector<ClusterState, I, L>,
    task: TaskId,
) -> AssignResult<Option<Shortfall>>
where
    I: Fn(&ClusterState, &ProcessId, &TaskId) -> bool,
    L: Fn(&ClusterState, &ProcessId) -> Load,
{
    let mut num_remaining = remaining.get(&task).copied().unwrap_or(0);

    while num_remaining > 0 {
        let Some(process) = selector.poll(cluster, &task) else {
            break;
        };
        cluster.assign_standby(&process, task)?;
        num_remaining -= 1;
        debug!(
            task = %task,
            process = %process,
            load = cluster.assigned_load(&process),
            remaining = num_remaining,
            "assigned standby"
        );
        selector.offer(cluster, process);
        remaining.insert(task, num_remaining);
    }

    if num_remaining == 0 {
        return Ok(None);
    }

    warn!(
        task = %task,
        unassigned = num_remaining,
        requested = num_standby_replicas,
        "unable to assign all standby replicas: not enough eligible processes, \
         add instances to reach the requested replica count"
    );
    Ok(Some(Shortfall {
        task_id: task,
        requested: num_standby_replicas,
        unassigned: num_remaining,
    }))
}

/// Runs a full standby assignment pass over a cluster snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandbyAssignor {
    num_standby_replicas: u32,
    max_tasks_per_process: Option<u32>,
}

impl StandbyAssignor {
    pub fn new(num_standby_replicas: u32) -> Self {
        Self {
            num_standby_replicas,
            max_tasks_per_process: None,
        }
    }

    pub fn from_config(config: &AssignorConfig) -> Self {
        Self {
            num_standby_replicas: config.num_standby_replicas(),
            max_tasks_per_process: config.max_tasks_per_process(),
        }
    }

    /// Default task limit for processes whose snapshot sets none.
    pub fn with_max_tasks_per_process(mut self, max_tasks: Option<u32>) -> Self {
        self.max_tasks_per_process = max_tasks;
        self
    }

    pub fn num_standby_replicas(&self) -> u32 {
        self.num_standby_replicas
    }

    /// Validate `snapshot` and assign standbys for every stateful task in
    /// ascending task id order.
    ///
    /// Fails only on a malformed snapshot or a broken placement invariant.
    /// Missing capacity is reported through [`StandbyPlan::shortfalls`].
    pub fn assign(&self, snapshot: &ClusterSnapshot) -> AssignResult<StandbyPlan> {
        let mut cluster = ClusterState::from_snapshot(snapshot, self.max_tasks_per_process)?;
        let mut remaining =
            compute_remaining_standbys(self.num_standby_replicas, &snapshot.stateful_tasks);
        let mut shortfalls = Vec::new();

        if self.num_standby_replicas == 0 {
            debug!("standby replication disabled, nothing to assign");
            return Ok(StandbyPlan::new(&cluster, remaining, shortfalls));
        }

        let mut selector = least_loaded_constrained_by_assigned_task();
        let processes: Vec<ProcessId> = cluster.process_ids().cloned().collect();
        selector.offer_all(&cluster, processes);

        for task in &snapshot.stateful_tasks {
            if let Some(shortfall) = assign_standbys_for_task(
                self.num_standby_replicas,
                &mut cluster,
                &mut remaining,
                &mut selector,
                *task,
            )? {
                shortfalls.push(shortfall);
            }
        }

        let plan = StandbyPlan::new(&cluster, remaining, shortfalls);
        info!(
            processes = cluster.len(),
            stateful_tasks = snapshot.stateful_tasks.len(),
            replicas = self.num_standby_replicas,
            assigned = plan.total_standbys(),
            under_replicated = plan.shortfalls.len(),
            "standby assignment complete"
        );
        Ok(plan)
    }
}
