//! Runtime adapters for spawning queue-internal futures.

use std::future::Future;

/// Abstraction over the runtime used to run dispatch and settlement futures.
///
/// The queue itself never blocks; everything asynchronous goes through this
/// seam so an alternative executor can be supplied in tests or embedded
/// environments. Timers still use `tokio::time`, so spawned futures must run
/// inside a tokio runtime.
pub trait Spawn: Send + Sync + 'static {
    /// Spawn a future to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Spawner backed by a tokio runtime handle.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Create a spawner from an explicit runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Create a spawner for the ambient runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime context.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
