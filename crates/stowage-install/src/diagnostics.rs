//! Sink for best-effort results.
//!
//! Temp-file cleanup and stale-target snapshots may fail without failing the
//! operation around them. Such results are passed through [`record`], which
//! logs the error and hands back the value when there is one.

use std::fmt::Display;

/// Log `result` at `warn` when it is an error and discard the error.
pub fn record<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(%error, "{context}");
            None
        }
    }
}
