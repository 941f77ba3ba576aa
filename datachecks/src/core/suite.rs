//! Suites: named collections of checks driven through a fixed lifecycle.
//!
//! One call to [`Suite::run`] or [`Suite::run_async`] is one execution
//! episode: setup once, per-check work (sequential or fanned out), teardown
//! once. Checks are cloned from their templates per episode, so repeated
//! runs never share metadata or context.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use crate::core::check::Check;
use crate::core::context::{Dataset, ScheduleOverride, SuiteConfig, SuiteContext};
use crate::core::rule::{RuleOutcome, RuleParams};
use crate::error::{DataCheckError, Result};
use crate::recorder::{
    ExecutionHandle, ExecutionRecorder, ExecutionStatus, NullRecorder, SuiteInfo,
};
use crate::registry::CheckRegistry;

/// What the suite does with a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop processing subsequent checks and return the first failure after
    /// teardown.
    #[default]
    Abort,
    /// Record the failure and keep going; `run` resolves `Ok` and failures
    /// stay visible in the report metadata.
    Continue,
}

/// Observation hooks fired around each check's execution.
///
/// Purely observational: returning from a hook never changes control flow.
/// Every method has a no-op default.
#[async_trait]
pub trait SuiteHooks: Send + Sync {
    /// Fired after a check finishes without failures.
    async fn on_check_success(&self, _check: &str) {}

    /// Fired after a check finishes with a failure, before the suite's
    /// failure policy is applied.
    async fn on_check_failure(&self, _check: &str, _error: &DataCheckError) {}
}

/// Default hooks implementation that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl SuiteHooks for NoopHooks {}

/// Per-check results of one suite episode.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    suite: String,
    checks: Vec<(String, HashMap<String, RuleOutcome>)>,
}

impl SuiteReport {
    fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            checks: Vec::new(),
        }
    }

    fn push(&mut self, check: impl Into<String>, metadata: HashMap<String, RuleOutcome>) {
        self.checks.push((check.into(), metadata));
    }

    /// Returns the suite name.
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Number of checks that ran in this episode.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when no checks ran.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Returns the recorded outcomes for one check.
    pub fn check_metadata(&self, check: &str) -> Option<&HashMap<String, RuleOutcome>> {
        self.checks
            .iter()
            .find(|(name, _)| name == check)
            .map(|(_, metadata)| metadata)
    }

    /// Returns every check's outcomes keyed by check name.
    pub fn all_metadata(&self) -> HashMap<String, HashMap<String, RuleOutcome>> {
        self.checks.iter().cloned().collect()
    }

    /// True if any rule invocation in any check failed.
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|(_, metadata)| metadata.values().any(RuleOutcome::is_failure))
    }
}

/// One unstarted unit of per-check work, for external schedulers.
///
/// Produced by [`Suite::check_runs`]; owns a fresh check instance with the
/// suite's context already attached, so it can be executed independently of
/// the suite that minted it.
#[derive(Debug)]
pub struct CheckRun {
    check: Check,
    rule_tags: Option<HashSet<String>>,
}

impl CheckRun {
    /// Returns the check name.
    pub fn name(&self) -> &str {
        self.check.name()
    }

    /// Returns the underlying check.
    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Executes the unit's rules sequentially and consumes the unit.
    pub async fn run(mut self) -> CheckRunResult {
        let result = self.check.run_all(self.rule_tags.as_ref()).await;
        CheckRunResult {
            check: self.check.name().to_string(),
            metadata: self.check.metadata().clone(),
            result,
        }
    }
}

/// Outcome of one executed [`CheckRun`].
#[derive(Debug)]
pub struct CheckRunResult {
    /// Name of the check that ran.
    pub check: String,
    /// Recorded outcomes per rule.
    pub metadata: HashMap<String, RuleOutcome>,
    /// Aggregate result of the run.
    pub result: Result<()>,
}

enum CheckSource {
    Instance(Check),
    Registered(String),
}

/// A named collection of checks executed as one unit.
///
/// # Examples
///
/// ```rust
/// use datachecks::core::{Check, Rule, Suite};
///
/// # async fn demo() -> datachecks::error::Result<()> {
/// let suite = Suite::builder("payments")
///     .description("payments data quality")
///     .check(
///         Check::builder("volume")
///             .rule(Rule::new("row_count_positive", |_ctx, _params| async { Ok(()) }))
///             .build(),
///     )
///     .build()?;
///
/// let report = suite.run(None).await?;
/// assert!(!report.has_failures());
/// # Ok(())
/// # }
/// ```
pub struct Suite {
    name: String,
    description: Option<String>,
    templates: Vec<Check>,
    dataset: Option<Dataset>,
    config: SuiteConfig,
    rule_tags: HashMap<String, HashSet<String>>,
    rule_overrides: HashMap<String, HashMap<String, Vec<RuleParams>>>,
    schedule_only: bool,
    policy: FailurePolicy,
    recorder: Arc<dyn ExecutionRecorder>,
    hooks: Arc<dyn SuiteHooks>,
}

impl Suite {
    /// Creates a new builder for constructing a suite.
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder::new(name)
    }

    /// Returns the suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the suite description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the check templates matching a tag filter, declaration order.
    /// A `None` filter matches every check.
    pub fn checks_with_tags(&self, tags: Option<&HashSet<String>>) -> Vec<&Check> {
        self.templates
            .iter()
            .filter(|check| check.matches_tags(tags))
            .collect()
    }

    fn info(&self) -> SuiteInfo {
        SuiteInfo {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Attaches the per-episode context to a check: dataset, shared config,
    /// and the schedule override resolved by check name.
    fn before(&self, check: &mut Check) {
        let mut context = SuiteContext::new()
            .with_shared(Arc::new(self.config.shared.clone()))
            .with_schedule(self.config.schedules.get(check.name()).cloned());
        if let Some(dataset) = &self.dataset {
            context = context.with_dataset(dataset.clone());
        }
        check.set_context(context);
    }

    /// Mints fresh check instances for one episode: clones the templates
    /// matching the tag filter, applies rule-parameter overrides, attaches
    /// the context and the recorder. Schedule-only episodes get a
    /// [`NullRecorder`] so no execution rows are opened.
    fn fresh_checks(&self, tags: Option<&HashSet<String>>) -> Vec<Check> {
        let recorder: Arc<dyn ExecutionRecorder> = if self.schedule_only {
            Arc::new(NullRecorder)
        } else {
            self.recorder.clone()
        };
        self.templates
            .iter()
            .filter(|template| template.matches_tags(tags))
            .map(|template| {
                let mut check = template.clone();
                if let Some(overrides) = self.rule_overrides.get(check.name()) {
                    for (rule, sets) in overrides {
                        check.set_rule_params(rule.clone(), sets.clone());
                    }
                }
                self.before(&mut check);
                check.set_recorder(recorder.clone());
                check
            })
            .collect()
    }

    /// Opens the episode: records the suite definition and, unless
    /// schedule-only, a suite execution row.
    async fn setup(&self) -> Result<Option<ExecutionHandle>> {
        info!(suite = %self.name, schedule_only = self.schedule_only, "suite setup");
        self.recorder
            .on_suite_definition(&self.info(), &self.config.schedules)
            .await?;
        if self.schedule_only {
            return Ok(None);
        }
        self.recorder.on_suite_setup(&self.info()).await
    }

    /// Closes the episode's suite execution row.
    async fn teardown(&self, handle: Option<ExecutionHandle>, status: ExecutionStatus) -> Result<()> {
        info!(suite = %self.name, ?status, "suite teardown");
        if let Some(handle) = handle {
            self.recorder.on_suite_teardown(handle, status).await?;
        }
        Ok(())
    }

    async fn observe(&self, check: &str, result: &Result<()>) {
        match result {
            Ok(()) => self.hooks.on_check_success(check).await,
            Err(err) => {
                warn!(check, error = %err, "check failed");
                self.hooks.on_check_failure(check, err).await;
            }
        }
    }

    /// Runs the suite sequentially: checks in declaration order, each
    /// completing before the next starts.
    ///
    /// Under [`FailurePolicy::Abort`] the first failed check stops the
    /// remaining checks; teardown still runs and the failure is returned
    /// afterwards. Under [`FailurePolicy::Continue`] every check runs and
    /// the report is returned with failures visible in its metadata.
    pub async fn run(&self, tags: Option<&HashSet<String>>) -> Result<SuiteReport> {
        let suite_handle = self.setup().await?;
        let mut checks = self.fresh_checks(tags);
        let total = checks.len();

        let mut report = SuiteReport::new(&self.name);
        let mut first_error = None;

        for (index, check) in checks.iter_mut().enumerate() {
            println!("[{}/{} Checks] {}", index + 1, total, check.name());
            let rule_tags = self.rule_tags.get(check.name());
            let result = check.run_all(rule_tags).await;
            self.observe(check.name(), &result).await;
            report.push(check.name(), check.metadata().clone());

            if let Err(err) = result {
                first_error.get_or_insert(err);
                if self.policy == FailurePolicy::Abort {
                    break;
                }
            }
        }

        let status = if first_error.is_some() {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Success
        };
        self.teardown(suite_handle, status).await?;

        match (first_error, self.policy) {
            (Some(err), FailurePolicy::Abort) => Err(err),
            _ => Ok(report),
        }
    }

    /// Runs the suite concurrently: one unit per check, launched together
    /// and joined. Every unit completes before teardown; failures are raised
    /// only after the join, so a failing check never cancels its siblings.
    pub async fn run_async(&self, tags: Option<&HashSet<String>>) -> Result<SuiteReport> {
        let suite_handle = self.setup().await?;
        let checks = self.fresh_checks(tags);
        let total = checks.len();

        let futures: Vec<_> = checks
            .into_iter()
            .enumerate()
            .map(|(index, mut check)| {
                let rule_tags = self.rule_tags.get(check.name()).cloned();
                async move {
                    println!("[{}/{} Checks] {}", index + 1, total, check.name());
                    let result = check.run_all_async(rule_tags.as_ref()).await;
                    (check, result)
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut report = SuiteReport::new(&self.name);
        let mut first_error = None;
        for (check, result) in results {
            self.observe(check.name(), &result).await;
            report.push(check.name(), check.metadata().clone());
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        let status = if first_error.is_some() {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Success
        };
        self.teardown(suite_handle, status).await?;

        match (first_error, self.policy) {
            (Some(err), FailurePolicy::Abort) => Err(err),
            _ => Ok(report),
        }
    }

    /// Returns the per-check work as unstarted units, without running setup
    /// or teardown. Intended for external schedulers that execute each unit
    /// on their own cadence.
    pub fn check_runs(&self, tags: Option<&HashSet<String>>) -> Vec<CheckRun> {
        self.fresh_checks(tags)
            .into_iter()
            .map(|check| {
                let rule_tags = self.rule_tags.get(check.name()).cloned();
                CheckRun { check, rule_tags }
            })
            .collect()
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("checks", &self.templates.len())
            .field("schedule_only", &self.schedule_only)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for constructing [`Suite`] instances.
///
/// `build` validates every registry reference and returns
/// [`DataCheckError::UnknownCheck`] for names with no registered factory,
/// so misconfiguration surfaces at build time, not mid-episode.
pub struct SuiteBuilder {
    name: String,
    description: Option<String>,
    sources: Vec<CheckSource>,
    registry: CheckRegistry,
    dataset: Option<Dataset>,
    config: SuiteConfig,
    rule_tags: HashMap<String, HashSet<String>>,
    rule_overrides: HashMap<String, HashMap<String, Vec<RuleParams>>>,
    schedule_only: bool,
    policy: FailurePolicy,
    recorder: Arc<dyn ExecutionRecorder>,
    hooks: Arc<dyn SuiteHooks>,
}

impl SuiteBuilder {
    /// Creates a new suite builder with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sources: Vec::new(),
            registry: CheckRegistry::new(),
            dataset: None,
            config: SuiteConfig::default(),
            rule_tags: HashMap::new(),
            rule_overrides: HashMap::new(),
            schedule_only: false,
            policy: FailurePolicy::default(),
            recorder: Arc::new(NullRecorder),
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Sets the description for the suite.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a check instance.
    pub fn check(mut self, check: Check) -> Self {
        self.sources.push(CheckSource::Instance(check));
        self
    }

    /// Adds a check by its registered name, resolved against the registry at
    /// build time.
    pub fn registered(mut self, name: impl Into<String>) -> Self {
        self.sources.push(CheckSource::Registered(name.into()));
        self
    }

    /// Sets the registry used to resolve registered check names.
    pub fn registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attaches the shared dataset reference handed to every rule body.
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Replaces the suite configuration (shared values and schedules).
    pub fn config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets one shared configuration value.
    pub fn shared_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.config.shared.insert(key.into(), value.into());
        self
    }

    /// Sets the schedule override for one check.
    pub fn schedule(mut self, check: impl Into<String>, schedule: ScheduleOverride) -> Self {
        self.config.schedules.insert(check.into(), schedule);
        self
    }

    /// Restricts one check to rules carrying at least one of the given tags.
    pub fn rule_tags<I, S>(mut self, check: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_tags
            .insert(check.into(), tags.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the parameter sets of one rule in one check.
    pub fn rule_override(
        mut self,
        check: impl Into<String>,
        rule: impl Into<String>,
        sets: Vec<RuleParams>,
    ) -> Self {
        self.rule_overrides
            .entry(check.into())
            .or_default()
            .insert(rule.into(), sets);
        self
    }

    /// Enables schedule-only mode: the suite definition and schedules are
    /// recorded, but no execution rows are opened and check work still runs
    /// unrecorded.
    pub fn schedule_only(mut self, schedule_only: bool) -> Self {
        self.schedule_only = schedule_only;
        self
    }

    /// Sets the failure policy. Defaults to [`FailurePolicy::Abort`].
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the execution recorder. Defaults to [`NullRecorder`].
    pub fn recorder(mut self, recorder: Arc<dyn ExecutionRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Sets the observation hooks. Defaults to [`NoopHooks`].
    pub fn hooks(mut self, hooks: Arc<dyn SuiteHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Builds the suite, resolving registered check names.
    pub fn build(self) -> Result<Suite> {
        let mut templates = Vec::with_capacity(self.sources.len());
        for source in self.sources {
            match source {
                CheckSource::Instance(check) => templates.push(check),
                CheckSource::Registered(name) => templates.push(self.registry.create(&name)?),
            }
        }
        Ok(Suite {
            name: self.name,
            description: self.description,
            templates,
            dataset: self.dataset,
            config: self.config,
            rule_tags: self.rule_tags,
            rule_overrides: self.rule_overrides,
            schedule_only: self.schedule_only,
            policy: self.policy,
            recorder: self.recorder,
            hooks: self.hooks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::Rule;
    use crate::recorder::InMemoryRecorder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn passing_check(name: &str) -> Check {
        Check::builder(name)
            .rule(Rule::new("always_ok", |_ctx, _params| async { Ok(()) }))
            .build()
    }

    fn failing_check(name: &str) -> Check {
        Check::builder(name)
            .rule(Rule::new("always_bad", |_ctx, _params| async {
                Err(DataCheckError::rule_failed("always_bad", "bad"))
            }))
            .build()
    }

    #[tokio::test]
    async fn test_run_returns_report_with_metadata() {
        let suite = Suite::builder("payments")
            .check(passing_check("volume"))
            .check(passing_check("freshness"))
            .build()
            .unwrap();

        let report = suite.run(None).await.unwrap();
        assert_eq!(report.len(), 2);
        assert!(!report.has_failures());
        assert!(report.check_metadata("volume").unwrap().contains_key("always_ok"));
    }

    #[tokio::test]
    async fn test_abort_policy_skips_later_checks_but_tears_down() {
        let recorder = InMemoryRecorder::new();
        let suite = Suite::builder("payments")
            .check(failing_check("broken"))
            .check(passing_check("never_reached"))
            .recorder(Arc::new(recorder.clone()))
            .build()
            .unwrap();

        let err = suite.run(None).await.unwrap_err();
        assert!(matches!(err, DataCheckError::CheckFailed { .. }));

        // Only the failing check ran.
        let checks = recorder.check_executions().await;
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].check, "broken");

        // Teardown closed the suite row as failed.
        let suites = recorder.suite_executions().await;
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].status, ExecutionStatus::Failure);
        assert!(suites[0].finished_at.is_some());
    }

    #[tokio::test]
    async fn test_continue_policy_runs_every_check() {
        let suite = Suite::builder("payments")
            .check(failing_check("broken"))
            .check(passing_check("still_runs"))
            .failure_policy(FailurePolicy::Continue)
            .build()
            .unwrap();

        let report = suite.run(None).await.unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.has_failures());
        assert!(report.check_metadata("still_runs").is_some());
    }

    #[tokio::test]
    async fn test_check_tag_filter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let suite = Suite::builder("payments")
            .check(
                Check::builder("nightly_check")
                    .tag("nightly")
                    .rule(Rule::new("counted", move |_ctx, _params| {
                        let c = c.clone();
                        async move {
                            c.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        }
                    }))
                    .build(),
            )
            .check(passing_check("untagged"))
            .build()
            .unwrap();

        let wanted: HashSet<String> = ["nightly".to_string()].into();
        let report = suite.run(Some(&wanted)).await.unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(report.check_metadata("untagged").is_none());
    }

    #[tokio::test]
    async fn test_checks_with_tags_preserves_declaration_order() {
        let suite = Suite::builder("payments")
            .check(Check::builder("a").tag("x").build())
            .check(Check::builder("b").build())
            .check(Check::builder("c").tag("x").build())
            .build()
            .unwrap();

        let wanted: HashSet<String> = ["x".to_string()].into();
        let names: Vec<_> = suite
            .checks_with_tags(Some(&wanted))
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "c"]);

        assert_eq!(suite.checks_with_tags(None).len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_registered_check_fails_at_build() {
        let err = Suite::builder("payments")
            .registered("missing")
            .build()
            .unwrap_err();
        assert!(matches!(err, DataCheckError::UnknownCheck { .. }));
    }

    #[tokio::test]
    async fn test_registered_checks_resolve_through_the_registry() {
        let mut registry = CheckRegistry::new();
        registry.register("volume", || passing_check("volume"));

        let suite = Suite::builder("payments")
            .registry(registry)
            .registered("volume")
            .build()
            .unwrap();

        let report = suite.run(None).await.unwrap();
        assert!(report.check_metadata("volume").is_some());
    }

    #[tokio::test]
    async fn test_context_reaches_rule_bodies() {
        let suite = Suite::builder("payments")
            .dataset(Arc::new(vec![1_i64, 2, 3]))
            .shared_value("env", "staging")
            .check(
                Check::builder("ctx")
                    .rule(Rule::new("sees_context", |ctx, _params| async move {
                        let rows = ctx.dataset::<Vec<i64>>().ok_or_else(|| {
                            DataCheckError::rule_failed("sees_context", "no dataset")
                        })?;
                        if rows.len() == 3 && ctx.shared_value("env").is_some() {
                            Ok(())
                        } else {
                            Err(DataCheckError::rule_failed("sees_context", "wrong context"))
                        }
                    }))
                    .build(),
            )
            .build()
            .unwrap();

        let report = suite.run(None).await.unwrap();
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_schedule_override_resolved_by_check_name() {
        let suite = Suite::builder("payments")
            .schedule("scheduled", ScheduleOverride::Check("0 8 * * *".to_string()))
            .check(
                Check::builder("scheduled")
                    .rule(Rule::new("sees_schedule", |ctx, _params| async move {
                        match ctx.schedule().and_then(|s| s.for_rule("sees_schedule")) {
                            Some("0 8 * * *") => Ok(()),
                            other => Err(DataCheckError::rule_failed(
                                "sees_schedule",
                                format!("unexpected schedule: {other:?}"),
                            )),
                        }
                    }))
                    .build(),
            )
            .build()
            .unwrap();

        let report = suite.run(None).await.unwrap();
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_two_runs_are_independent_episodes() {
        let recorder = InMemoryRecorder::new();
        let suite = Suite::builder("payments")
            .check(passing_check("volume"))
            .recorder(Arc::new(recorder.clone()))
            .build()
            .unwrap();

        suite.run(None).await.unwrap();
        suite.run(None).await.unwrap();

        let suites = recorder.suite_executions().await;
        assert_eq!(suites.len(), 2);
        assert_ne!(suites[0].id, suites[1].id);
        assert_eq!(recorder.rule_executions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_check_runs_dry_mode() {
        let recorder = InMemoryRecorder::new();
        let suite = Suite::builder("payments")
            .check(passing_check("volume"))
            .check(failing_check("broken"))
            .recorder(Arc::new(recorder.clone()))
            .build()
            .unwrap();

        let runs = suite.check_runs(None);
        assert_eq!(runs.len(), 2);

        // No setup happened: no suite execution row exists.
        assert!(recorder.suite_executions().await.is_empty());

        for run in runs {
            let name = run.name().to_string();
            let outcome = run.run().await;
            assert_eq!(outcome.check, name);
            if name == "broken" {
                assert!(outcome.result.is_err());
                assert!(outcome.metadata["always_bad"].is_failure());
            } else {
                assert!(outcome.result.is_ok());
            }
        }

        // The units themselves still record their rule executions.
        assert_eq!(recorder.rule_executions().await.len(), 2);
        assert!(recorder.suite_executions().await.is_empty());
    }

    #[tokio::test]
    async fn test_hooks_observe_outcomes() {
        struct CountingHooks {
            successes: AtomicUsize,
            failures: AtomicUsize,
        }

        #[async_trait]
        impl SuiteHooks for CountingHooks {
            async fn on_check_success(&self, _check: &str) {
                self.successes.fetch_add(1, Ordering::SeqCst);
            }
            async fn on_check_failure(&self, _check: &str, _error: &DataCheckError) {
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
        }

        let hooks = Arc::new(CountingHooks {
            successes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        });
        let suite = Suite::builder("payments")
            .check(passing_check("ok"))
            .check(failing_check("bad"))
            .failure_policy(FailurePolicy::Continue)
            .hooks(hooks.clone())
            .build()
            .unwrap();

        suite.run(None).await.unwrap();
        assert_eq!(hooks.successes.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rule_override_from_suite() {
        let suite = Suite::builder("payments")
            .check(
                Check::builder("sized")
                    .rule(
                        Rule::new("min_rows", |_ctx, params| async move {
                            match params.kwarg("min").and_then(|v| v.as_i64()) {
                                Some(min) if min <= 3 => Ok(()),
                                other => Err(DataCheckError::rule_failed(
                                    "min_rows",
                                    format!("bad min: {other:?}"),
                                )),
                            }
                        })
                        .with_params(RuleParams::new().with_kwarg("min", 100)),
                    )
                    .build(),
            )
            .rule_override(
                "sized",
                "min_rows",
                vec![RuleParams::new().with_kwarg("min", 3)],
            )
            .build()
            .unwrap();

        // The preset would fail; the suite-level override succeeds.
        let report = suite.run(None).await.unwrap();
        assert!(!report.has_failures());
    }
}
