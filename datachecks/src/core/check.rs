//! Checks: named groups of rules driven through a fixed hook sequence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::capture;
use crate::core::context::SuiteContext;
use crate::core::rule::{FailureDetail, Rule, RuleOutcome, RuleParams};
use crate::error::{DataCheckError, Result};
use crate::recorder::{CheckInfo, ExecutionRecorder, ExecutionStatus, NullRecorder, RuleInfo};

/// A named group of related rules sharing a category/tag set.
///
/// A check owns its rules exclusively and drives each one through the
/// before/invoke/success-or-failure/after sequence, recording every
/// invocation with the configured [`ExecutionRecorder`]. Rule failures are
/// caught and recorded per invocation and never stop iteration; after all
/// invocations complete, `run_all` resolves to a single aggregate
/// `CheckFailed` error if any invocation failed.
///
/// Checks are `Clone` so a suite can mint a fresh instance (with empty
/// metadata) for every execution episode.
///
/// # Examples
///
/// ```rust
/// use datachecks::core::{Check, Rule, RuleParams};
///
/// let check = Check::builder("volume")
///     .description("row volume sanity")
///     .tag("nightly")
///     .rule(
///         Rule::new("row_count_positive", |_ctx, _params| async { Ok(()) })
///             .with_params(RuleParams::new().with_kwarg("min", 1)),
///     )
///     .build();
/// assert_eq!(check.name(), "volume");
/// ```
#[derive(Clone)]
pub struct Check {
    name: String,
    description: Option<String>,
    tags: HashSet<String>,
    rules: Vec<Rule>,
    rules_params: HashMap<String, Vec<RuleParams>>,
    metadata: HashMap<String, RuleOutcome>,
    context: SuiteContext,
    recorder: Arc<dyn ExecutionRecorder>,
}

impl Check {
    /// Creates a new builder for constructing a check.
    pub fn builder(name: impl Into<String>) -> CheckBuilder {
        CheckBuilder::new(name)
    }

    /// Returns the check name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the check description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the check's tag set.
    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the last recorded outcome per rule name.
    pub fn metadata(&self) -> &HashMap<String, RuleOutcome> {
        &self.metadata
    }

    /// Returns the execution context currently attached to this check.
    pub fn context(&self) -> &SuiteContext {
        &self.context
    }

    /// Attaches the execution context for the current episode. Called by the
    /// suite's `before` hook; standalone callers may set it directly.
    pub fn set_context(&mut self, context: SuiteContext) {
        self.context = context;
    }

    /// Sets the recorder used for lifecycle events. Defaults to
    /// [`NullRecorder`].
    pub fn set_recorder(&mut self, recorder: Arc<dyn ExecutionRecorder>) {
        self.recorder = recorder;
    }

    /// Overrides the parameter sets for one rule by name.
    pub fn set_rule_params(&mut self, rule: impl Into<String>, sets: Vec<RuleParams>) {
        self.rules_params.insert(rule.into(), sets);
    }

    /// Tag filter semantics: included iff the tag sets intersect; a `None`
    /// filter includes every check.
    pub fn matches_tags(&self, tags: Option<&HashSet<String>>) -> bool {
        match tags {
            None => true,
            Some(wanted) => !wanted.is_disjoint(&self.tags),
        }
    }

    fn info(&self) -> CheckInfo {
        CheckInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.iter().cloned().collect(),
        }
    }

    /// The effective parameter sets for one rule: a per-check override if
    /// configured, otherwise the rule's presets, otherwise one empty set.
    fn effective_params(&self, rule: &Rule) -> Vec<RuleParams> {
        let sets = self
            .rules_params
            .get(rule.name())
            .cloned()
            .unwrap_or_else(|| rule.params().to_vec());
        if sets.is_empty() {
            vec![RuleParams::default()]
        } else {
            sets
        }
    }

    /// One (rule, parameter set) work item per invocation, declaration order.
    fn invocation_units(&self, tags: Option<&HashSet<String>>) -> Vec<(Rule, RuleParams)> {
        self.rules
            .iter()
            .filter(|rule| rule.matches_tags(tags))
            .flat_map(|rule| {
                self.effective_params(rule)
                    .into_iter()
                    .map(move |params| (rule.clone(), params))
            })
            .collect()
    }

    /// Drives one rule invocation through its full hook sequence:
    /// record start, capture-scoped body, success/failure routing, record
    /// end with captured logs. Returns the invocation's outcome; an `Err`
    /// here means the recorder itself failed, never the rule body.
    async fn invoke_rule(
        recorder: Arc<dyn ExecutionRecorder>,
        context: SuiteContext,
        check: String,
        rule: Rule,
        params: RuleParams,
    ) -> Result<RuleOutcome> {
        let info = RuleInfo {
            check,
            name: rule.name().to_string(),
            description: rule.description().map(String::from),
            tags: rule.tags().iter().cloned().collect(),
        };
        let handle = recorder.on_rule_start(&info, &params).await?;

        debug!(rule = %rule.name(), params = ?params, "invoking rule");
        let (result, logs) = capture::scoped(rule.invoke(context, params.clone())).await;

        // Captured output is deferred, not lost: replay it once the scope
        // has closed so concurrent invocations print whole blocks.
        if !logs.trim().is_empty() {
            print!("{logs}");
        }

        let outcome = match result {
            Ok(()) => {
                if let Some(handle) = handle {
                    recorder.on_rule_success(handle).await?;
                }
                RuleOutcome::success(params.clone())
            }
            Err(err) => {
                let failure = FailureDetail::from_error(&err);
                warn!(rule = %rule.name(), error = %err, "rule failed");
                if let Some(handle) = handle {
                    recorder.on_rule_failure(handle, &failure).await?;
                }
                RuleOutcome::failure(params.clone(), failure)
            }
        };

        if let Some(handle) = handle {
            recorder.on_rule_end(handle, &params, &logs).await?;
        }
        Ok(outcome)
    }

    fn aggregate(&self, total: usize, failures: &[String]) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        Err(DataCheckError::check_failed(
            &self.name,
            format!(
                "{} of {} rule invocations failed; first: {}",
                failures.len(),
                total,
                failures[0]
            ),
        ))
    }

    /// Runs every matching rule sequentially, one invocation per parameter
    /// set, in declaration order. Metadata is updated after each invocation.
    pub async fn run_all(&mut self, tags: Option<&HashSet<String>>) -> Result<()> {
        let check_handle = self.recorder.on_check_start(&self.info()).await?;
        let units = self.invocation_units(tags);
        let total = units.len();
        let mut failures = Vec::new();

        for (rule, params) in units {
            let rule_name = rule.name().to_string();
            let outcome = Self::invoke_rule(
                self.recorder.clone(),
                self.context.clone(),
                self.name.clone(),
                rule,
                params,
            )
            .await?;
            if let Some(failure) = &outcome.failure {
                failures.push(failure.message.clone());
            }
            self.metadata.insert(rule_name, outcome);
        }

        let status = if failures.is_empty() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        };
        if let Some(handle) = check_handle {
            self.recorder.on_check_end(handle, status).await?;
        }
        self.aggregate(total, &failures)
    }

    /// Runs every matching rule concurrently: one unit per (rule, parameter
    /// set) pair, launched together and joined. Hook ordering within a unit
    /// is preserved; there is no ordering guarantee across units, and a
    /// failing unit never cancels its siblings. All units complete before
    /// this resolves.
    pub async fn run_all_async(&mut self, tags: Option<&HashSet<String>>) -> Result<()> {
        let check_handle = self.recorder.on_check_start(&self.info()).await?;
        let units = self.invocation_units(tags);
        let total = units.len();

        let futures: Vec<_> = units
            .into_iter()
            .map(|(rule, params)| {
                let recorder = self.recorder.clone();
                let context = self.context.clone();
                let check = self.name.clone();
                async move {
                    let rule_name = rule.name().to_string();
                    let outcome = Self::invoke_rule(recorder, context, check, rule, params).await;
                    (rule_name, outcome)
                }
            })
            .collect();

        let results = join_all(futures).await;

        // Recorder errors surface only after every unit has resolved.
        let mut failures = Vec::new();
        let mut recorder_error = None;
        for (rule_name, result) in results {
            match result {
                Ok(outcome) => {
                    if let Some(failure) = &outcome.failure {
                        failures.push(failure.message.clone());
                    }
                    self.metadata.insert(rule_name, outcome);
                }
                Err(err) => {
                    recorder_error.get_or_insert(err);
                }
            }
        }

        let status = if failures.is_empty() && recorder_error.is_none() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        };
        if let Some(handle) = check_handle {
            self.recorder.on_check_end(handle, status).await?;
        }
        if let Some(err) = recorder_error {
            return Err(err);
        }
        self.aggregate(total, &failures)
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("rules", &self.rules.len())
            .field("metadata", &self.metadata.len())
            .finish()
    }
}

/// Builder for constructing [`Check`] instances.
#[derive(Debug)]
pub struct CheckBuilder {
    name: String,
    description: Option<String>,
    tags: HashSet<String>,
    rules: Vec<Rule>,
    rules_params: HashMap<String, Vec<RuleParams>>,
}

impl CheckBuilder {
    /// Creates a new check builder with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: HashSet::new(),
            rules: Vec::new(),
            rules_params: HashMap::new(),
        }
    }

    /// Sets the description for the check.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag to the check.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds multiple tags to the check.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds a rule to the check.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds multiple rules to the check.
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        self.rules.extend(rules);
        self
    }

    /// Overrides the parameter sets for one rule by name.
    pub fn rule_params(mut self, rule: impl Into<String>, sets: Vec<RuleParams>) -> Self {
        self.rules_params.insert(rule.into(), sets);
        self
    }

    /// Builds the `Check` instance.
    pub fn build(self) -> Check {
        Check {
            name: self.name,
            description: self.description,
            tags: self.tags,
            rules: self.rules,
            rules_params: self.rules_params,
            metadata: HashMap::new(),
            context: SuiteContext::new(),
            recorder: Arc::new(NullRecorder),
        }
    }
}
