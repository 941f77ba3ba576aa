//! Rules: the smallest schedulable unit of a check.
//!
//! A rule wraps a user-supplied async assertion plus zero or more preset
//! parameter sets. Invoking a rule with one parameter set produces exactly
//! one [`RuleOutcome`]; body errors never escape an invocation.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::core::context::SuiteContext;
use crate::error::{DataCheckError, Result};

/// One parameter set for a rule invocation: positional arguments plus
/// keyword arguments, both JSON-valued so they can be persisted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Positional arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
    /// Keyword arguments.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub kwargs: serde_json::Map<String, serde_json::Value>,
}

impl RuleParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn with_arg(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets a keyword argument.
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Returns the positional argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&serde_json::Value> {
        self.args.get(index)
    }

    /// Returns the keyword argument named `key`, if present.
    pub fn kwarg(&self, key: &str) -> Option<&serde_json::Value> {
        self.kwargs.get(key)
    }

    /// True when the set carries no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Serializes the parameter set to a JSON string for persistence.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Terminal status of one rule invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// The rule body returned without error.
    Success,
    /// The rule body returned an error.
    Failure,
}

impl RuleStatus {
    /// Returns true if this is a Success status.
    pub fn is_success(&self) -> bool {
        matches!(self, RuleStatus::Success)
    }

    /// Returns true if this is a Failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, RuleStatus::Failure)
    }
}

/// Structured failure payload: the rendered error plus its source chain.
///
/// The chain is the closest Rust analogue to a traceback; it is persisted
/// alongside the execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// The top-level error message.
    pub message: String,
    /// Messages of the underlying source errors, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

impl FailureDetail {
    /// Creates a failure detail with no source chain.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chain: Vec::new(),
        }
    }

    /// Builds a failure detail from an error, walking its source chain.
    pub fn from_error(err: &DataCheckError) -> Self {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            chain,
        }
    }

    /// Serializes the failure detail to a JSON string for persistence.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The recorded outcome of one rule invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Terminal status of the invocation.
    pub status: RuleStatus,
    /// The parameter set the rule was invoked with.
    pub params: RuleParams,
    /// Failure payload, present iff `status` is `Failure`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
}

impl RuleOutcome {
    /// Creates a successful outcome.
    pub fn success(params: RuleParams) -> Self {
        Self {
            status: RuleStatus::Success,
            params,
            failure: None,
        }
    }

    /// Creates a failed outcome.
    pub fn failure(params: RuleParams, failure: FailureDetail) -> Self {
        Self {
            status: RuleStatus::Failure,
            params,
            failure: Some(failure),
        }
    }

    /// Returns true if the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the invocation failed.
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// Boxed future returned by a rule body.
pub type RuleFuture = BoxFuture<'static, Result<()>>;

/// Boxed rule body: invoked once per parameter set with the episode context.
pub type RuleFn = Arc<dyn Fn(SuiteContext, RuleParams) -> RuleFuture + Send + Sync>;

/// A single assertion over a dataset, declared on a check.
///
/// Names must be unique within a check; uniqueness is enforced upstream at
/// registration, not here.
///
/// ```rust
/// use datachecks::core::{Rule, RuleParams};
/// use datachecks::error::DataCheckError;
///
/// let rule = Rule::new("row_count_positive", |ctx, params| async move {
///     let rows = ctx.dataset::<Vec<i64>>().ok_or_else(|| {
///         DataCheckError::rule_failed("row_count_positive", "no dataset attached")
///     })?;
///     let min = params.kwarg("min").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
///     if rows.len() >= min {
///         Ok(())
///     } else {
///         Err(DataCheckError::rule_failed(
///             "row_count_positive",
///             format!("expected at least {min} rows, found {}", rows.len()),
///         ))
///     }
/// })
/// .with_tag("volume")
/// .with_params(RuleParams::new().with_kwarg("min", 1));
/// ```
#[derive(Clone)]
pub struct Rule {
    name: String,
    description: Option<String>,
    tags: HashSet<String>,
    params: Vec<RuleParams>,
    body: RuleFn,
}

impl Rule {
    /// Creates a rule from a name and an async body.
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(SuiteContext, RuleParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let body: RuleFn = Arc::new(move |ctx, params| body(ctx, params).boxed());
        Self {
            name: name.into(),
            description: None,
            tags: HashSet::new(),
            params: Vec::new(),
            body,
        }
    }

    /// Sets the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds multiple tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds one preset parameter set. A rule with no sets is invoked once
    /// with empty parameters.
    pub fn with_params(mut self, params: RuleParams) -> Self {
        self.params.push(params);
        self
    }

    /// Replaces the preset parameter sets.
    pub fn with_param_sets(mut self, sets: Vec<RuleParams>) -> Self {
        self.params = sets;
        self
    }

    /// Returns the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rule description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the rule's tag set.
    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// Returns the preset parameter sets.
    pub fn params(&self) -> &[RuleParams] {
        &self.params
    }

    /// Tag filter semantics: included iff the tag sets intersect; a `None`
    /// filter includes every rule.
    pub fn matches_tags(&self, tags: Option<&HashSet<String>>) -> bool {
        match tags {
            None => true,
            Some(wanted) => !wanted.is_disjoint(&self.tags),
        }
    }

    /// Invokes the rule body with one parameter set.
    pub(crate) fn invoke(&self, ctx: SuiteContext, params: RuleParams) -> RuleFuture {
        (self.body)(ctx, params)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("tags", &self.tags)
            .field("param_sets", &self.params.len())
            .finish()
    }
}
