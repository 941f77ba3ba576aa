//! Integration tests for the execution recorder seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datachecks::core::{Check, Rule, RuleParams, ScheduleOverride, Suite};
use datachecks::error::{DataCheckError, Result};
use datachecks::recorder::{
    ExecutionHandle, ExecutionRecorder, ExecutionStatus, InMemoryRecorder, NullRecorder, SuiteInfo,
};
use datachecks::say;

fn passing_check(name: &str) -> Check {
    Check::builder(name)
        .description("always passes")
        .rule(Rule::new("ok", |_ctx, _params| async { Ok(()) }))
        .build()
}

#[tokio::test]
async fn full_episode_produces_consistent_rows() {
    let recorder = InMemoryRecorder::new();
    let suite = Suite::builder("payments")
        .description("payments data quality")
        .check(
            Check::builder("volume")
                .rule(
                    Rule::new("row_count", |_ctx, params| async move {
                        let min = params.kwarg("min").and_then(|v| v.as_i64()).unwrap_or(0);
                        say!("checking row count against {min}");
                        if min <= 10 {
                            Ok(())
                        } else {
                            Err(DataCheckError::rule_failed("row_count", "too few rows"))
                        }
                    })
                    .with_params(RuleParams::new().with_kwarg("min", 5)),
                )
                .build(),
        )
        .recorder(Arc::new(recorder.clone()))
        .build()
        .unwrap();

    suite.run(None).await.unwrap();

    // Definition row.
    let definitions = recorder.definitions().await;
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name, "payments");
    assert_eq!(
        definitions[0].description.as_deref(),
        Some("payments data quality")
    );

    // Suite row opened by setup and closed by teardown.
    let suites = recorder.suite_executions().await;
    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0].suite, "payments");
    assert_eq!(suites[0].status, ExecutionStatus::Success);
    assert!(suites[0].finished_at.unwrap() >= suites[0].started_at);

    // Check row.
    let checks = recorder.check_executions().await;
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].check, "volume");
    assert_eq!(checks[0].status, ExecutionStatus::Success);

    // Rule row carries params, logs, and no failure.
    let rules = recorder.rule_executions().await;
    assert_eq!(rules.len(), 1);
    let row = &rules[0];
    assert_eq!(row.check, "volume");
    assert_eq!(row.rule, "row_count");
    assert_eq!(row.status, ExecutionStatus::Success);
    assert_eq!(row.params.as_deref(), Some(r#"{"kwargs":{"min":5}}"#));
    assert_eq!(row.logs.as_deref(), Some("checking row count against 5\n"));
    assert!(row.failure.is_none());
}

#[tokio::test]
async fn failed_rule_rows_carry_the_failure_payload() {
    let recorder = InMemoryRecorder::new();
    let suite = Suite::builder("payments")
        .check(
            Check::builder("volume")
                .rule(Rule::new("row_count", |_ctx, _params| async {
                    Err(DataCheckError::rule_failed("row_count", "row count was zero"))
                }))
                .build(),
        )
        .recorder(Arc::new(recorder.clone()))
        .build()
        .unwrap();

    suite.run(None).await.unwrap_err();

    let rules = recorder.rule_executions().await;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].status, ExecutionStatus::Failure);
    let failure = rules[0].failure.as_ref().unwrap();
    assert!(failure.message.contains("row count was zero"));
}

// Schedule-only mode records the definition with its schedules but opens no
// execution rows, even though the checks still run.
#[tokio::test]
async fn schedule_only_records_definition_without_executions() {
    let recorder = InMemoryRecorder::new();
    let suite = Suite::builder("scheduled")
        .schedule(
            "volume",
            ScheduleOverride::Check("0 8 * * *".to_string()),
        )
        .check(passing_check("volume"))
        .schedule_only(true)
        .recorder(Arc::new(recorder.clone()))
        .build()
        .unwrap();

    let report = suite.run(None).await.unwrap();
    assert_eq!(report.len(), 1);
    assert!(!report.has_failures());

    assert_eq!(recorder.definitions().await.len(), 1);
    assert!(recorder.suite_executions().await.is_empty());
    assert!(recorder.check_executions().await.is_empty());
    assert!(recorder.rule_executions().await.is_empty());
}

#[tokio::test]
async fn null_recorder_episodes_still_run() {
    let suite = Suite::builder("unrecorded")
        .check(passing_check("volume"))
        .recorder(Arc::new(NullRecorder))
        .build()
        .unwrap();

    let report = suite.run(None).await.unwrap();
    assert!(!report.has_failures());
}

// A custom backend that only records definitions: the engine must treat the
// absent handles as "skip every follow-up callback".
#[derive(Clone, Default)]
struct DefinitionOnlyRecorder {
    definitions: Arc<tokio::sync::Mutex<Vec<SuiteInfo>>>,
}

#[async_trait]
impl ExecutionRecorder for DefinitionOnlyRecorder {
    async fn on_suite_definition(
        &self,
        suite: &SuiteInfo,
        _schedules: &HashMap<String, ScheduleOverride>,
    ) -> Result<()> {
        self.definitions.lock().await.push(suite.clone());
        Ok(())
    }
}

#[tokio::test]
async fn backends_may_decline_to_open_executions() {
    let recorder = DefinitionOnlyRecorder::default();
    let suite = Suite::builder("definition_only")
        .check(passing_check("volume"))
        .recorder(Arc::new(recorder.clone()))
        .build()
        .unwrap();

    let report = suite.run(None).await.unwrap();
    assert!(!report.has_failures());
    assert_eq!(recorder.definitions.lock().await.len(), 1);
}

// A backend whose rule callbacks fail: the error surfaces from the suite as
// a recorder error, not as a check failure.
struct BrokenRecorder;

#[async_trait]
impl ExecutionRecorder for BrokenRecorder {
    async fn on_rule_start(
        &self,
        _rule: &datachecks::recorder::RuleInfo,
        _params: &RuleParams,
    ) -> Result<Option<ExecutionHandle>> {
        Err(DataCheckError::recorder("on_rule_start", "backend offline"))
    }
}

#[tokio::test]
async fn recorder_failures_surface_as_recorder_errors() {
    let suite = Suite::builder("broken_backend")
        .check(passing_check("volume"))
        .recorder(Arc::new(BrokenRecorder))
        .build()
        .unwrap();

    let err = suite.run(None).await.unwrap_err();
    assert!(matches!(err, DataCheckError::Recorder { .. }));
    assert!(err.to_string().contains("backend offline"));
}
