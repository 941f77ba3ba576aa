//! Execution record rows handed to recorder backends.
//!
//! These are the denormalized lifecycle rows a persistence collaborator
//! stores: one per suite, check, and rule execution, plus the definition
//! payloads describing the suite/check/rule themselves. The engine only
//! creates and updates rows; querying is a backend concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExecutionHandle;
use crate::core::rule::FailureDetail;

/// Lifecycle status of an execution row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// The execution has started and not yet finished.
    Running,
    /// The execution finished without failures.
    Success,
    /// The execution finished with at least one failure.
    Failure,
}

impl ExecutionStatus {
    /// Returns true if this is a terminal status.
    pub fn is_finished(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// Definition payload describing a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteInfo {
    /// Suite name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Definition payload describing a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInfo {
    /// Check name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category / tag set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Definition payload describing a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Name of the owning check.
    pub check: String,
    /// Rule name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tag set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// One persisted suite execution episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteExecution {
    /// Opaque execution identity.
    pub id: ExecutionHandle,
    /// Name of the suite.
    pub suite: String,
    /// Lifecycle status.
    pub status: ExecutionStatus,
    /// When the episode started.
    pub started_at: DateTime<Utc>,
    /// When the episode finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
}

/// One persisted check execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckExecution {
    /// Opaque execution identity.
    pub id: ExecutionHandle,
    /// Name of the check.
    pub check: String,
    /// Lifecycle status.
    pub status: ExecutionStatus,
    /// When the check started.
    pub started_at: DateTime<Utc>,
    /// When the check finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
}

/// One persisted rule invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExecution {
    /// Opaque execution identity, assigned before the rule body runs and
    /// stable for the whole invocation.
    pub id: ExecutionHandle,
    /// Name of the owning check.
    pub check: String,
    /// Name of the rule.
    pub rule: String,
    /// Lifecycle status.
    pub status: ExecutionStatus,
    /// When the invocation started.
    pub started_at: DateTime<Utc>,
    /// When the invocation finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Serialized parameter set (JSON text).
    pub params: Option<String>,
    /// Captured log output.
    pub logs: Option<String>,
    /// Structured failure payload for failed invocations.
    pub failure: Option<FailureDetail>,
}
