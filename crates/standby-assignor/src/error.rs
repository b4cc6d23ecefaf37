//! Assignor error types.

use standby_core::{ProcessId, TaskId};
use thiserror::Error;

/// Errors that abort a scheduling run.
///
/// Capacity shortfall is not an error; it is reported as a
/// [`Shortfall`](standby_core::Shortfall) in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("duplicate process id in snapshot: {0}")]
    DuplicateProcess(ProcessId),

    #[error("task {task} is active on both {first} and {second}")]
    DuplicateActiveTask {
        task: TaskId,
        first: ProcessId,
        second: ProcessId,
    },

    #[error("stateful task {0} is not active on any process")]
    UnownedStatefulTask(TaskId),

    #[error("unknown process: {0}")]
    UnknownProcess(ProcessId),

    #[error("process {process} already holds task {task}")]
    TaskAlreadyAssigned { process: ProcessId, task: TaskId },
}

pub type AssignResult<T> = Result<T, AssignError>;
