//! standby-assignor: places standby replicas of stateful tasks.
//!
//! Given a snapshot of which process runs which tasks as active, decides
//! which other processes should keep warm standby copies. It does NOT
//! compute the active assignment or ship the result to workers; it is a
//! pure computation over one snapshot.
//!
//! # Components
//!
//! - **`process_state`**: per-process active/standby sets and load
//! - **`selector`**: least-loaded candidate pool with a per-task constraint
//! - **`assignor`**: the standby assignment loop and full-run driver
//! - **`validate`**: snapshot checks applied before a run starts
//! - **`report`**: text rendering of a plan

pub mod assignor;
pub mod error;
pub mod process_state;
pub mod report;
pub mod selector;
pub mod validate;

pub use assignor::{StandbyAssignor, StandbyPlan, assign_standbys_for_task, compute_remaining_standbys};
pub use error::{AssignError, AssignResult};
pub use process_state::{ClusterState, Load, ProcessState};
pub use report::format_plan;
pub use selector::{ConstrainedCandidateSelector, StandbySelector, least_loaded_constrained_by_assigned_task};
pub use validate::validate_snapshot;
