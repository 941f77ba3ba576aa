//! In-memory implementation of `ExecutionRecorder` for testing and
//! development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use super::record::{
    CheckExecution, CheckInfo, ExecutionStatus, RuleExecution, RuleInfo, SuiteExecution, SuiteInfo,
};
use super::{ExecutionHandle, ExecutionRecorder};
use crate::core::context::ScheduleOverride;
use crate::core::rule::{FailureDetail, RuleParams};
use crate::error::{DataCheckError, Result};

/// Recorder that keeps every execution row in memory.
///
/// Useful for tests, development, and as a reference for real backends.
/// Clones share storage, so a test can hold one clone while the suite under
/// test holds another.
#[derive(Clone, Default)]
pub struct InMemoryRecorder {
    definitions: Arc<RwLock<Vec<SuiteInfo>>>,
    suite_executions: Arc<RwLock<HashMap<ExecutionHandle, SuiteExecution>>>,
    check_executions: Arc<RwLock<HashMap<ExecutionHandle, CheckExecution>>>,
    rule_executions: Arc<RwLock<HashMap<ExecutionHandle, RuleExecution>>>,
}

impl InMemoryRecorder {
    /// Creates a new empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded suite definitions, in registration order.
    pub async fn definitions(&self) -> Vec<SuiteInfo> {
        self.definitions.read().await.clone()
    }

    /// Returns all suite execution rows.
    pub async fn suite_executions(&self) -> Vec<SuiteExecution> {
        self.suite_executions.read().await.values().cloned().collect()
    }

    /// Returns all check execution rows.
    pub async fn check_executions(&self) -> Vec<CheckExecution> {
        self.check_executions.read().await.values().cloned().collect()
    }

    /// Returns all rule execution rows.
    pub async fn rule_executions(&self) -> Vec<RuleExecution> {
        self.rule_executions.read().await.values().cloned().collect()
    }

    /// Returns the rule execution rows for one rule name.
    pub async fn rule_executions_for(&self, rule: &str) -> Vec<RuleExecution> {
        self.rule_executions
            .read()
            .await
            .values()
            .filter(|row| row.rule == rule)
            .cloned()
            .collect()
    }

    /// Clears all stored rows.
    pub async fn clear(&self) {
        self.definitions.write().await.clear();
        self.suite_executions.write().await.clear();
        self.check_executions.write().await.clear();
        self.rule_executions.write().await.clear();
    }

    fn unknown_handle(operation: &str, handle: ExecutionHandle) -> DataCheckError {
        DataCheckError::recorder(operation, format!("unknown execution handle: {handle}"))
    }
}

#[async_trait]
impl ExecutionRecorder for InMemoryRecorder {
    #[instrument(skip(self, _schedules), fields(suite = %suite.name, recorder = "in_memory"))]
    async fn on_suite_definition(
        &self,
        suite: &SuiteInfo,
        _schedules: &HashMap<String, ScheduleOverride>,
    ) -> Result<()> {
        self.definitions.write().await.push(suite.clone());
        Ok(())
    }

    #[instrument(skip(self), fields(suite = %suite.name, recorder = "in_memory"))]
    async fn on_suite_setup(&self, suite: &SuiteInfo) -> Result<Option<ExecutionHandle>> {
        let handle = ExecutionHandle::new();
        let row = SuiteExecution {
            id: handle,
            suite: suite.name.clone(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.suite_executions.write().await.insert(handle, row);
        Ok(Some(handle))
    }

    #[instrument(skip(self), fields(check = %check.name, recorder = "in_memory"))]
    async fn on_check_start(&self, check: &CheckInfo) -> Result<Option<ExecutionHandle>> {
        let handle = ExecutionHandle::new();
        let row = CheckExecution {
            id: handle,
            check: check.name.clone(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.check_executions.write().await.insert(handle, row);
        Ok(Some(handle))
    }

    #[instrument(skip(self, params), fields(rule = %rule.name, recorder = "in_memory"))]
    async fn on_rule_start(
        &self,
        rule: &RuleInfo,
        params: &RuleParams,
    ) -> Result<Option<ExecutionHandle>> {
        let handle = ExecutionHandle::new();
        let row = RuleExecution {
            id: handle,
            check: rule.check.clone(),
            rule: rule.name.clone(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            params: Some(params.to_json()?),
            logs: None,
            failure: None,
        };
        self.rule_executions.write().await.insert(handle, row);
        Ok(Some(handle))
    }

    #[instrument(skip(self), fields(recorder = "in_memory"))]
    async fn on_rule_success(&self, handle: ExecutionHandle) -> Result<()> {
        let mut rows = self.rule_executions.write().await;
        let row = rows
            .get_mut(&handle)
            .ok_or_else(|| Self::unknown_handle("on_rule_success", handle))?;
        row.status = ExecutionStatus::Success;
        Ok(())
    }

    #[instrument(skip(self, failure), fields(recorder = "in_memory"))]
    async fn on_rule_failure(
        &self,
        handle: ExecutionHandle,
        failure: &FailureDetail,
    ) -> Result<()> {
        let mut rows = self.rule_executions.write().await;
        let row = rows
            .get_mut(&handle)
            .ok_or_else(|| Self::unknown_handle("on_rule_failure", handle))?;
        row.status = ExecutionStatus::Failure;
        row.failure = Some(failure.clone());
        Ok(())
    }

    #[instrument(skip(self, params, logs), fields(recorder = "in_memory"))]
    async fn on_rule_end(
        &self,
        handle: ExecutionHandle,
        params: &RuleParams,
        logs: &str,
    ) -> Result<()> {
        let mut rows = self.rule_executions.write().await;
        let row = rows
            .get_mut(&handle)
            .ok_or_else(|| Self::unknown_handle("on_rule_end", handle))?;
        row.params = Some(params.to_json()?);
        row.logs = Some(logs.to_string());
        row.finished_at = Some(Utc::now());
        Ok(())
    }

    #[instrument(skip(self), fields(recorder = "in_memory"))]
    async fn on_check_end(&self, handle: ExecutionHandle, status: ExecutionStatus) -> Result<()> {
        let mut rows = self.check_executions.write().await;
        let row = rows
            .get_mut(&handle)
            .ok_or_else(|| Self::unknown_handle("on_check_end", handle))?;
        row.status = status;
        row.finished_at = Some(Utc::now());
        Ok(())
    }

    #[instrument(skip(self), fields(recorder = "in_memory"))]
    async fn on_suite_teardown(
        &self,
        handle: ExecutionHandle,
        status: ExecutionStatus,
    ) -> Result<()> {
        let mut rows = self.suite_executions.write().await;
        let row = rows
            .get_mut(&handle)
            .ok_or_else(|| Self::unknown_handle("on_suite_teardown", handle))?;
        row.status = status;
        row.finished_at = Some(Utc::now());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecorder").finish_non_exhaustive()
    }
}
