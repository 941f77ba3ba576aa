//! Prelude for commonly used types and traits in datachecks.

pub use crate::core::{
    Check, CheckRun, Dataset, FailurePolicy, Rule, RuleOutcome, RuleParams, RuleStatus,
    ScheduleOverride, Suite, SuiteConfig, SuiteContext, SuiteHooks, SuiteReport,
};
pub use crate::error::{DataCheckError, ErrorContext, Result};
pub use crate::logging::LogConfig;
pub use crate::recorder::{ExecutionRecorder, ExecutionStatus, InMemoryRecorder, NullRecorder};
pub use crate::registry::CheckRegistry;
pub use crate::say;
