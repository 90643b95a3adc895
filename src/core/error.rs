//! Error types for queue operations.

use thiserror::Error;

/// Fixed message attached to failures that did not produce an error value
/// (a panicking operation, for example). Kept distinct from any payload the
/// failure may have carried.
pub const NON_ERROR_FAILURE_MESSAGE: &str = "task failed with a value that was not an error";

/// Outcome type a task operation yields: the caller's value, or a failure.
pub type TaskResult<T> = Result<T, anyhow::Error>;

/// A failure captured from a settled task.
///
/// The queue never aborts on task failure; captured errors accumulate in
/// settlement order and surface through the drain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskError {
    message: String,
}

impl TaskError {
    /// Capture a failure produced by a task operation.
    pub(crate) fn from_failure(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    /// Capture a failure that carried no error value at all.
    pub(crate) fn non_error() -> Self {
        Self {
            message: NON_ERROR_FAILURE_MESSAGE.to_owned(),
        }
    }

    /// The captured failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
