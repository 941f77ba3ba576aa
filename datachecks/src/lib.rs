//! # Datachecks - Data Quality Orchestration for Rust
//!
//! Datachecks is a data quality framework built around three layers: rules
//! (single async assertions), checks (named groups of rules), and suites
//! (collections of checks executed as one unit with a setup/teardown
//! lifecycle). Every lifecycle event flows through a pluggable
//! [`recorder::ExecutionRecorder`], so executions can be persisted for audit
//! without coupling the engine to a storage backend.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use datachecks::prelude::*;
//! use datachecks::core::Check;
//!
//! # async fn example() -> Result<()> {
//! let suite = Suite::builder("payments")
//!     .description("payments data quality")
//!     .dataset(Arc::new(vec![100_i64, 250, 75]))
//!     .check(
//!         Check::builder("volume")
//!             .tag("nightly")
//!             .rule(
//!                 Rule::new("row_count_at_least", |ctx, params| async move {
//!                     let rows = ctx.dataset::<Vec<i64>>().ok_or_else(|| {
//!                         DataCheckError::rule_failed("row_count_at_least", "no dataset")
//!                     })?;
//!                     let min = params.kwarg("min").and_then(|v| v.as_u64()).unwrap_or(1);
//!                     if rows.len() as u64 >= min {
//!                         Ok(())
//!                     } else {
//!                         Err(DataCheckError::rule_failed(
//!                             "row_count_at_least",
//!                             format!("expected at least {min} rows, found {}", rows.len()),
//!                         ))
//!                     }
//!                 })
//!                 .with_params(RuleParams::new().with_kwarg("min", 2)),
//!             )
//!             .build(),
//!     )
//!     .recorder(Arc::new(InMemoryRecorder::new()))
//!     .build()?;
//!
//! let report = suite.run(None).await?;
//! assert!(!report.has_failures());
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution semantics
//!
//! - One `run` (or `run_async`) call is one execution episode: setup once,
//!   per-check work, teardown once. Teardown always runs, even when a check
//!   fails and the failure is returned afterwards.
//! - A rule with K parameter sets is invoked K times (once with empty
//!   parameters when K = 0); each invocation gets its own execution record.
//! - Rule failures are caught at the check boundary, recorded, and
//!   aggregated; they never abort sibling rules. A failed check surfaces as
//!   a single `CheckFailed` error routed through the suite's
//!   [`core::FailurePolicy`].
//! - `run_async` launches one unit per check and joins them all before
//!   raising, so a failing check never cancels its siblings.
//! - Output emitted through [`capture::emit`] or the [`say!`] macro inside a
//!   rule body is captured per invocation, persisted with the execution
//!   record, and replayed to stdout afterwards.
//!
//! ## Architecture
//!
//! - **`core`**: `Rule`, `Check`, `Suite`, and the execution context
//! - **`recorder`**: the persistence seam (`ExecutionRecorder`,
//!   `InMemoryRecorder`, `NullRecorder`)
//! - **`registry`**: named check factories, validated at suite build time
//! - **`capture`**: per-invocation output capture
//! - **`logging`**: `tracing` subscriber setup for embedding applications

pub mod capture;
pub mod core;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod recorder;
pub mod registry;
