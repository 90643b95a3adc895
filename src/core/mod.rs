//! Core scheduling abstractions: task units, queue state machine, errors.

pub mod error;
pub mod queue;
pub mod task;

pub use error::{TaskError, TaskResult, NON_ERROR_FAILURE_MESSAGE};
pub use queue::{DrainOptions, ErrorsObserved, PacedQueue};
pub use task::{TaskFuture, TaskUnit};
