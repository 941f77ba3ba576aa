//! Execution context threaded from suite to check to rule.
//!
//! The context is an explicit per-episode value built by the suite at setup
//! time and handed down through each call boundary. Nothing in the engine
//! reads process-wide state.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque, read-shared dataset reference.
///
/// The engine never interprets the dataset; it only carries it to rule
/// bodies, which downcast it to a concrete type via
/// [`SuiteContext::dataset`]. Collaborators must treat the dataset as
/// immutable for the duration of an execution episode.
pub type Dataset = Arc<dyn Any + Send + Sync>;

/// A cron-like schedule override for a check or its individual rules.
///
/// Overrides are configuration carried to an external scheduler; the engine
/// resolves and forwards them but never executes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleOverride {
    /// One schedule string covering the check and all of its rules.
    Check(String),
    /// Per-rule schedule strings, keyed by rule name.
    Rules(HashMap<String, String>),
}

impl ScheduleOverride {
    /// Resolves the schedule for a single rule: a check-wide override applies
    /// to every rule, a per-rule map only to the rules it names.
    pub fn for_rule(&self, rule: &str) -> Option<&str> {
        match self {
            ScheduleOverride::Check(schedule) => Some(schedule),
            ScheduleOverride::Rules(rules) => rules.get(rule).map(String::as_str),
        }
    }
}

/// Suite-level configuration shared across all checks in an episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Shared fields visible to every check and rule in the suite.
    #[serde(default)]
    pub shared: serde_json::Map<String, serde_json::Value>,
    /// Schedule overrides keyed by check name.
    #[serde(default)]
    pub schedules: HashMap<String, ScheduleOverride>,
}

/// Mutable shared state for one execution episode, attached to each check by
/// the suite's `before` hook and read by rule bodies during invocation.
#[derive(Clone, Default)]
pub struct SuiteContext {
    dataset: Option<Dataset>,
    shared: Arc<serde_json::Map<String, serde_json::Value>>,
    schedule: Option<ScheduleOverride>,
}

impl SuiteContext {
    /// Creates an empty context with no dataset, config, or schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the shared dataset reference.
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Attaches the shared configuration map.
    pub fn with_shared(mut self, shared: Arc<serde_json::Map<String, serde_json::Value>>) -> Self {
        self.shared = shared;
        self
    }

    /// Attaches the schedule override resolved for the current check.
    pub fn with_schedule(mut self, schedule: Option<ScheduleOverride>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Downcasts the dataset to a concrete type.
    ///
    /// Returns `None` if no dataset is attached or the type does not match.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use datachecks::core::SuiteContext;
    ///
    /// let ctx = SuiteContext::new().with_dataset(Arc::new(vec![1_i64, 2, 3]));
    /// let rows = ctx.dataset::<Vec<i64>>().unwrap();
    /// assert_eq!(rows.len(), 3);
    /// ```
    pub fn dataset<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.dataset.clone().and_then(|d| d.downcast::<T>().ok())
    }

    /// Returns the untyped dataset reference, if one is attached.
    pub fn raw_dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Returns the shared configuration map.
    pub fn shared(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.shared
    }

    /// Looks up a single shared configuration value.
    pub fn shared_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.shared.get(key)
    }

    /// Returns the schedule override resolved for the current check.
    pub fn schedule(&self) -> Option<&ScheduleOverride> {
        self.schedule.as_ref()
    }
}

impl std::fmt::Debug for SuiteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteContext")
            .field("has_dataset", &self.dataset.is_some())
            .field("shared_keys", &self.shared.len())
            .field("schedule", &self.schedule)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_downcast() {
        let ctx = SuiteContext::new().with_dataset(Arc::new(String::from("payments")));
        assert_eq!(ctx.dataset::<String>().unwrap().as_str(), "payments");
        assert!(ctx.dataset::<Vec<u8>>().is_none());
    }

    #[test]
    fn test_empty_context() {
        let ctx = SuiteContext::new();
        assert!(ctx.raw_dataset().is_none());
        assert!(ctx.shared().is_empty());
        assert!(ctx.schedule().is_none());
    }

    #[test]
    fn test_shared_value_lookup() {
        let mut shared = serde_json::Map::new();
        shared.insert("env".to_string(), json!("staging"));
        let ctx = SuiteContext::new().with_shared(Arc::new(shared));

        assert_eq!(ctx.shared_value("env"), Some(&json!("staging")));
        assert_eq!(ctx.shared_value("missing"), None);
    }

    #[test]
    fn test_schedule_override_check_wide() {
        let schedule = ScheduleOverride::Check("0 8 * * *".to_string());
        assert_eq!(schedule.for_rule("any_rule"), Some("0 8 * * *"));
    }

    #[test]
    fn test_schedule_override_per_rule() {
        let mut rules = HashMap::new();
        rules.insert("rule_1".to_string(), "0 6 * * *".to_string());
        let schedule = ScheduleOverride::Rules(rules);

        assert_eq!(schedule.for_rule("rule_1"), Some("0 6 * * *"));
        assert_eq!(schedule.for_rule("rule_2"), None);
    }

    #[test]
    fn test_suite_config_deserialization() {
        let config: SuiteConfig = serde_json::from_value(json!({
            "shared": { "threshold": 0.95 },
            "schedules": {
                "NightlyCheck": "0 8 * * *",
                "HourlyCheck": { "row_count": "0 * * * *" }
            }
        }))
        .unwrap();

        assert_eq!(config.shared.get("threshold"), Some(&json!(0.95)));
        assert_eq!(
            config.schedules.get("NightlyCheck"),
            Some(&ScheduleOverride::Check("0 8 * * *".to_string()))
        );
        match config.schedules.get("HourlyCheck").unwrap() {
            ScheduleOverride::Rules(rules) => {
                assert_eq!(rules.get("row_count").map(String::as_str), Some("0 * * * *"));
            }
            other => panic!("expected per-rule override, got {other:?}"),
        }
    }
}
