//! Error types for the datachecks framework.
//!
//! This module provides the error handling strategy for the crate using
//! `thiserror` for automatic error trait implementations. All errors raised
//! by the execution engine are represented by the `DataCheckError` enum.

use thiserror::Error;

/// The main error type for the datachecks framework.
#[derive(Error, Debug)]
pub enum DataCheckError {
    /// A rule body signalled failure. This variant is always caught at the
    /// check runner boundary and recorded; it never propagates past a check.
    #[error("Rule '{rule}' failed: {message}")]
    RuleFailed {
        /// Name of the rule that failed
        rule: String,
        /// Human-readable failure message
        message: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more rule invocations inside a check failed. Raised by
    /// `Check::run_all` after every invocation has completed, and routed to
    /// the suite's failure policy.
    #[error("Check '{check}' failed: {message}")]
    CheckFailed {
        /// Name of the check that failed
        check: String,
        /// Summary of the failure(s)
        message: String,
    },

    /// A suite referenced a check identifier that is not present in the
    /// registry. Raised at suite build time, never at run time.
    #[error("Unknown check identifier '{name}'")]
    UnknownCheck { name: String },

    /// The execution recorder backend reported an error.
    #[error("Recorder error during {operation}: {message}")]
    Recorder {
        /// The lifecycle callback that failed (e.g. "on_rule_start")
        operation: String,
        /// Detailed error message
        message: String,
    },

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to suite or check configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, DataCheckError>`.
///
/// This is the standard `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, DataCheckError>;

impl DataCheckError {
    /// Creates a new rule failure with the given rule name and message.
    pub fn rule_failed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleFailed {
            rule: rule.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new rule failure with a source error.
    pub fn rule_failed_with_source(
        rule: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::RuleFailed {
            rule: rule.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new check failure.
    pub fn check_failed(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckFailed {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Creates a new recorder error.
    pub fn recorder(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Recorder {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<DataCheckError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            DataCheckError::Internal(format!("{}: {}", msg, base_error))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            DataCheckError::Internal(format!("{}: {}", f(), base_error))
        })
    }
}
