//! Per-invocation output capture for rule executions.
//!
//! The execution engine wraps every rule invocation in a capture scope so the
//! text a rule emits can be persisted as that invocation's log output. The
//! scope is a tokio task-local, set only while the wrapped future is being
//! polled, so concurrent invocations are isolated from one another even when
//! they run on the same task (e.g. under a `join_all`).
//!
//! Rule bodies emit output through [`emit`] or the [`say!`](crate::say) macro
//! and do no log plumbing themselves. Outside any capture scope both fall
//! through to stdout.

use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static CAPTURE: RefCell<String>;
}

/// Runs a future inside a fresh capture scope and returns its output together
/// with the text captured while it ran.
///
/// Scopes nest: an inner scope captures independently and the outer scope is
/// restored when it closes.
pub async fn scoped<F>(fut: F) -> (F::Output, String)
where
    F: Future,
{
    CAPTURE
        .scope(RefCell::new(String::new()), async move {
            let output = fut.await;
            let captured = CAPTURE.with(|buf| std::mem::take(&mut *buf.borrow_mut()));
            (output, captured)
        })
        .await
}

/// Appends a line to the active capture scope, or prints it to stdout when no
/// scope is active.
pub fn emit(line: impl AsRef<str>) {
    let line = line.as_ref();
    let captured = CAPTURE.try_with(|buf| {
        let mut buf = buf.borrow_mut();
        buf.push_str(line);
        buf.push('\n');
    });
    if captured.is_err() {
        println!("{line}");
    }
}

/// Returns true if a capture scope is active for the current future.
pub fn is_active() -> bool {
    CAPTURE.try_with(|_| ()).is_ok()
}

/// Emits formatted output from a rule body into the active capture scope.
///
/// ```rust
/// # async fn example() {
/// let ((), logs) = datachecks::capture::scoped(async {
///     datachecks::say!("checked {} rows", 42);
/// })
/// .await;
/// assert_eq!(logs, "checked 42 rows\n");
/// # }
/// ```
#[macro_export]
macro_rules! say {
    ($($arg:tt)*) => {
        $crate::capture::emit(format!($($arg)*))
    };
}
