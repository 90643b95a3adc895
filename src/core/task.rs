//! Unit-of-work abstraction: an async operation paired with an identifier.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::core::error::TaskResult;
use crate::util::token;

/// Boxed future a task operation produces once invoked.
pub type TaskFuture<T> = BoxFuture<'static, TaskResult<T>>;

type TaskOp<T> = Box<dyn FnOnce() -> TaskFuture<T> + Send + 'static>;

/// An asynchronous operation paired with a deduplication identifier.
///
/// Identity is carried entirely by the identifier; the operation itself never
/// participates in equality. Units are consumed on dispatch and the outcome of
/// [`TaskUnit::execute`] is the operation's own, unchanged.
pub struct TaskUnit<T> {
    op: TaskOp<T>,
    identifier: String,
}

impl<T> TaskUnit<T> {
    /// Wrap an operation with a generated identifier.
    pub fn new<F, Fut>(op: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        Self::with_identifier(token::generate(), op)
    }

    /// Wrap an operation with a caller-supplied identifier.
    pub fn with_identifier<F, Fut>(identifier: impl Into<String>, op: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        Self {
            op: Box::new(move || op().boxed()),
            identifier: identifier.into(),
        }
    }

    /// The deduplication identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Invoke the operation, consuming the unit.
    pub fn execute(self) -> TaskFuture<T> {
        (self.op)()
    }
}

impl<T> PartialEq for TaskUnit<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl<T> Eq for TaskUnit<T> {}

impl<T> fmt::Debug for TaskUnit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskUnit")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
