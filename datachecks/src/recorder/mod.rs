//! Execution recorder: the persistence seam for lifecycle events.
//!
//! The check and suite runners report lifecycle events (start, success,
//! failure, end) through the [`ExecutionRecorder`] trait. Backends persist
//! them however they like; the engine only needs create/update semantics and
//! an opaque handle per execution row.
//!
//! A backend may decline to open an execution (returning `None` from a
//! `*_start` callback, e.g. when a suite is in schedule-only mode); the
//! engine then skips every follow-up callback for that execution.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::context::ScheduleOverride;
use crate::core::rule::{FailureDetail, RuleParams};
use crate::error::Result;

pub mod memory;
pub mod record;

pub use memory::InMemoryRecorder;
pub use record::{
    CheckExecution, CheckInfo, ExecutionStatus, RuleExecution, RuleInfo, SuiteExecution, SuiteInfo,
};

/// Opaque identity of one persisted execution row.
///
/// Assigned by the recorder before the corresponding work runs and stable
/// for the whole before/run/success-or-failure/after sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionHandle(Uuid);

impl ExecutionHandle {
    /// Creates a fresh, unique handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExecutionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle callbacks consumed by the check and suite runners.
///
/// Every method has a no-op default, so a backend only implements the events
/// it cares about. Implementations must be `Send + Sync`; the engine calls
/// them from concurrently running units and expects the backend to handle
/// its own write concurrency.
#[async_trait]
pub trait ExecutionRecorder: Send + Sync {
    /// Records the suite's definition (name, description, configured
    /// schedules). Called on every episode, including schedule-only ones.
    async fn on_suite_definition(
        &self,
        _suite: &SuiteInfo,
        _schedules: &HashMap<String, ScheduleOverride>,
    ) -> Result<()> {
        Ok(())
    }

    /// Opens a suite execution row. Returning `None` makes every later
    /// suite-level callback a no-op.
    async fn on_suite_setup(&self, _suite: &SuiteInfo) -> Result<Option<ExecutionHandle>> {
        Ok(None)
    }

    /// Opens a check execution row.
    async fn on_check_start(&self, _check: &CheckInfo) -> Result<Option<ExecutionHandle>> {
        Ok(None)
    }

    /// Opens a rule execution row for one invocation.
    async fn on_rule_start(
        &self,
        _rule: &RuleInfo,
        _params: &RuleParams,
    ) -> Result<Option<ExecutionHandle>> {
        Ok(None)
    }

    /// Marks a rule invocation successful.
    async fn on_rule_success(&self, _handle: ExecutionHandle) -> Result<()> {
        Ok(())
    }

    /// Marks a rule invocation failed and stores the failure payload.
    async fn on_rule_failure(
        &self,
        _handle: ExecutionHandle,
        _failure: &FailureDetail,
    ) -> Result<()> {
        Ok(())
    }

    /// Closes a rule invocation: persists the serialized parameter set and
    /// the captured log output.
    async fn on_rule_end(
        &self,
        _handle: ExecutionHandle,
        _params: &RuleParams,
        _logs: &str,
    ) -> Result<()> {
        Ok(())
    }

    /// Closes a check execution row with its aggregate status.
    async fn on_check_end(&self, _handle: ExecutionHandle, _status: ExecutionStatus) -> Result<()> {
        Ok(())
    }

    /// Closes a suite execution row with its aggregate status.
    async fn on_suite_teardown(
        &self,
        _handle: ExecutionHandle,
        _status: ExecutionStatus,
    ) -> Result<()> {
        Ok(())
    }
}

/// Recorder that persists nothing: every callback is a no-op and no handles
/// are ever issued. The default for standalone checks and suites built
/// without a recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

#[async_trait]
impl ExecutionRecorder for NullRecorder {}
