//! Core engine types: rules, checks, suites, and the execution context.

pub mod check;
pub mod context;
pub mod rule;
pub mod suite;

pub use check::{Check, CheckBuilder};
pub use context::{Dataset, ScheduleOverride, SuiteConfig, SuiteContext};
pub use rule::{FailureDetail, Rule, RuleOutcome, RuleParams, RuleStatus};
pub use suite::{
    CheckRun, CheckRunResult, FailurePolicy, NoopHooks, Suite, SuiteBuilder, SuiteHooks,
    SuiteReport,
};
