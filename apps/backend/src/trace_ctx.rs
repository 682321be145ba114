//! Task-local trace id for the request currently being served.
//!
//! `TraceSpan` establishes the scope; error rendering and log statements read
//! it. Service code should not depend on this module.

use std::future::Future;

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

const UNKNOWN: &str = "unknown";

/// Trace id of the current task, or `"unknown"` outside a request scope.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` visible to [`trace_id()`].
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
