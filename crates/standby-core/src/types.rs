//! Shared types used across the standby assignor crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one stateful unit of work.
///
/// Ordered by subtopology first, then partition. Rendered as
/// `"<subtopology>_<partition>"`, e.g. `0_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    pub subtopology: u32,
    pub partition: u32,
}

impl TaskId {
    pub fn new(subtopology: u32, partition: u32) -> Self {
        Self {
            subtopology,
            partition,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.subtopology, self.partition)
    }
}

/// Error returned when a string is not a valid `TaskId`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task id `{0}`: expected <subtopology>_<partition>")]
pub struct TaskIdParseError(pub String);

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subtopology, partition) = s
            .split_once('_')
            .ok_or_else(|| TaskIdParseError(s.to_string()))?;
        let subtopology = parse_part(subtopology).ok_or_else(|| TaskIdParseError(s.to_string()))?;
        let partition = parse_part(partition).ok_or_else(|| TaskIdParseError(s.to_string()))?;
        Ok(Self::new(subtopology, partition))
    }
}

/// Plain decimal only: no sign, no leading zeros, so every id has exactly
/// one spelling.
fn parse_part(part: &str) -> Option<u32> {
    let digits = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits || (part.len() > 1 && part.starts_with('0')) {
        return None;
    }
    part.parse().ok()
}

impl TryFrom<String> for TaskId {
    type Error = TaskIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Opaque identifier for a cluster member able to run tasks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A stateful task that ended the run with fewer standbys than requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub task_id: TaskId,
    /// Configured replication factor.
    pub requested: u32,
    /// Replicas that could not be placed.
    pub unassigned: u32,
}

impl Shortfall {
    pub fn assigned(&self) -> u32 {
        self.requested.saturating_sub(self.unassigned)
    }
}
