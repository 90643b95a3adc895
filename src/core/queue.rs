//! Bounded-concurrency queue state machine: dispatch, settlement, drain.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;

use crate::config::QueueConfig;
use crate::core::error::{TaskError, TaskResult};
use crate::core::task::TaskUnit;
use crate::runtime::{Spawn, TokioSpawner};

/// Options controlling how [`PacedQueue::drain_with`] aggregates outcomes.
#[derive(Debug, Clone, Copy)]
pub struct DrainOptions {
    /// Resolve with success values only; captured errors never fail the drain.
    pub only_successes: bool,
    /// Reset counters and logs at quiescence, before the drain resolves.
    /// Tasks submitted after the drain call stay pending either way.
    pub clear_after: bool,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            only_successes: false,
            clear_after: true,
        }
    }
}

/// Boxed callback receiving the full ordered error log during an
/// only-successes drain.
pub type ErrorsObserved = Box<dyn FnOnce(Vec<TaskError>) + Send>;

struct QueueState<T> {
    pending: VecDeque<TaskUnit<T>>,
    /// Per-task outcomes in settlement-completion order.
    settled: Vec<Result<T, TaskError>>,
    /// Captured errors, also in settlement order. Only shrinks via clear.
    errors: Vec<TaskError>,
    running: u32,
    completed: u64,
    /// Dispatched tasks whose pacing delay has not yet elapsed.
    unsettled: usize,
    paused: bool,
    /// At most one saturation retry timer may be outstanding.
    retry_scheduled: bool,
}

impl<T> QueueState<T> {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            settled: Vec::new(),
            errors: Vec::new(),
            running: 0,
            completed: 0,
            unsettled: 0,
            paused: false,
            retry_scheduled: false,
        }
    }

    fn reset(&mut self, clear_pending: bool) {
        if clear_pending {
            self.pending.clear();
        }
        self.settled.clear();
        self.errors.clear();
        self.running = 0;
        self.completed = 0;
        self.unsettled = 0;
    }

    fn quiescent(&self) -> bool {
        self.pending.is_empty() && self.unsettled == 0
    }
}

struct Inner<T, S> {
    config: QueueConfig,
    state: Mutex<QueueState<T>>,
    spawner: S,
}

/// Bounded-concurrency task queue with paced settlements.
///
/// At most `capacity` tasks run simultaneously; the rest wait in FIFO order.
/// Each settlement is followed by a pacing delay before the slot's completion
/// signal re-triggers dispatch. Tasks sharing a pending identifier are
/// deduplicated, first submission wins.
///
/// # Ordering
///
/// Drain results are ordered by **settlement completion**, not submission.
/// The two orders coincide only at capacity 1, where exactly one task runs at
/// a time; under higher capacity a fast late submission can settle before a
/// slow early one.
///
/// # Failure semantics
///
/// A failing task never halts dispatch of the rest. Failures are captured in
/// settlement order and surface exclusively through the drain operations.
/// Nothing retries, and nothing cancels in-flight work; pause only withholds
/// future dispatch.
///
/// Handles are cheap to clone and share one queue. All state mutation is
/// serialized behind one lock, never held across an await point.
pub struct PacedQueue<T, S = TokioSpawner> {
    inner: Arc<Inner<T, S>>,
}

impl<T, S> Clone for PacedQueue<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PacedQueue<T, TokioSpawner>
where
    T: Send + 'static,
{
    /// Create a queue on the ambient tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime context.
    pub fn new(config: QueueConfig) -> Self {
        Self::with_spawner(config, TokioSpawner::current())
    }
}

impl<T, S> PacedQueue<T, S>
where
    T: Send + 'static,
    S: Spawn,
{
    /// Create a queue with an explicit spawner.
    pub fn with_spawner(config: QueueConfig, spawner: S) -> Self {
        debug_assert!(config.validate().is_ok());
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(QueueState::new()),
                spawner,
            }),
        }
    }

    /// Submit a bare operation, wrapped with a generated identifier.
    pub fn submit<F, Fut>(&self, op: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        self.submit_task(TaskUnit::new(op));
    }

    /// Submit a single pre-built task unit.
    pub fn submit_task(&self, task: TaskUnit<T>) {
        self.submit_all(std::iter::once(task));
    }

    /// Submit a sequence of task units, preserving order.
    ///
    /// A unit whose identifier is already pending is silently discarded; the
    /// first submission wins. A scheduling pass runs afterwards unless the
    /// queue is paused.
    pub fn submit_all<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = TaskUnit<T>>,
    {
        let run_pass = {
            let mut state = self.inner.state.lock();
            for task in tasks {
                if state
                    .pending
                    .iter()
                    .any(|queued| queued.identifier() == task.identifier())
                {
                    tracing::debug!(
                        identifier = task.identifier(),
                        "duplicate identifier, submission discarded"
                    );
                    continue;
                }
                state.pending.push_back(task);
            }
            !state.paused
        };
        if run_pass {
            self.schedule_pass();
        }
    }

    /// Withhold future dispatch. Tasks already running settle normally.
    pub fn pause(&self) {
        self.inner.state.lock().paused = true;
        tracing::debug!("queue paused");
    }

    /// Resume dispatch, running a scheduling pass before returning.
    ///
    /// If capacity allows, the running count reflects the newly dispatched
    /// batch by the time this returns.
    pub fn resume(&self) {
        self.inner.state.lock().paused = false;
        tracing::debug!("queue resumed");
        self.schedule_pass();
    }

    /// Reset outcomes, errors, and counters; with `clear_pending`, drop queued
    /// tasks as well. A pure logical reset, infallible by contract.
    pub fn clear(&self, clear_pending: bool) {
        self.inner.state.lock().reset(clear_pending);
        tracing::debug!(clear_pending, "queue cleared");
    }

    /// Number of tasks waiting for dispatch.
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of tasks currently running. Never exceeds the capacity.
    pub fn running_count(&self) -> u32 {
        self.inner.state.lock().running
    }

    /// Number of tasks settled since creation or the last clear.
    pub fn completed_count(&self) -> u64 {
        self.inner.state.lock().completed
    }

    /// Number of errors captured since creation or the last clear.
    pub fn error_count(&self) -> usize {
        self.inner.state.lock().errors.len()
    }

    /// Whether dispatch is currently paused.
    pub fn is_paused(&self) -> bool {
        self.inner.state.lock().paused
    }

    /// One evaluation of whether to dispatch more pending work.
    ///
    /// Runs on submit, resume, each settlement completion, and the saturation
    /// retry timer. Redundant invocations are safe no-ops.
    fn schedule_pass(&self) {
        enum Action<T> {
            Idle,
            Dispatch(Vec<TaskUnit<T>>),
            Retry,
        }

        let action = {
            let mut state = self.inner.state.lock();
            if state.paused || state.pending.is_empty() {
                Action::Idle
            } else if state.running < self.inner.config.capacity() {
                // Batch size is bounded by the free slots, keeping
                // running <= capacity even when a pass fires mid-flight.
                let slots = (self.inner.config.capacity() - state.running) as usize;
                let take = slots.min(state.pending.len());
                state.running += take as u32;
                state.unsettled += take;
                Action::Dispatch(state.pending.drain(..take).collect())
            } else if state.retry_scheduled {
                Action::Idle
            } else {
                state.retry_scheduled = true;
                Action::Retry
            }
        };

        match action {
            Action::Idle => {}
            Action::Dispatch(batch) => {
                tracing::debug!(batch = batch.len(), "dispatching batch");
                for unit in batch {
                    self.dispatch(unit);
                }
            }
            Action::Retry => {
                let queue = self.clone();
                let interval = self.inner.config.poll_interval();
                self.inner.spawner.spawn(async move {
                    pacing(interval).await;
                    queue.inner.state.lock().retry_scheduled = false;
                    queue.schedule_pass();
                });
            }
        }
    }

    fn dispatch(&self, unit: TaskUnit<T>) {
        let queue = self.clone();
        let identifier = unit.identifier().to_owned();
        self.inner.spawner.spawn(async move {
            tracing::debug!(identifier = %identifier, "task started");
            let outcome = AssertUnwindSafe(unit.execute()).catch_unwind().await;
            let delay = queue.record_settlement(&identifier, outcome);
            pacing(delay).await;
            {
                let mut state = queue.inner.state.lock();
                state.unsettled = state.unsettled.saturating_sub(1);
            }
            queue.schedule_pass();
        });
    }

    /// Update counters and logs for one settled task; returns the pacing
    /// delay to apply before the settlement counts as finished.
    fn record_settlement(
        &self,
        identifier: &str,
        outcome: Result<TaskResult<T>, Box<dyn std::any::Any + Send>>,
    ) -> Duration {
        let mut state = self.inner.state.lock();
        state.running = state.running.saturating_sub(1);
        state.completed += 1;
        match outcome {
            Ok(Ok(value)) => {
                tracing::debug!(identifier, "task settled");
                state.settled.push(Ok(value));
                self.inner.config.success_delay()
            }
            Ok(Err(failure)) => {
                let err = TaskError::from_failure(&failure);
                tracing::warn!(identifier, error = %err, "task failed");
                state.errors.push(err.clone());
                state.settled.push(Err(err));
                self.inner.config.error_delay()
            }
            Err(_) => {
                // Panic payloads are not error values; normalize to the
                // fixed placeholder.
                let err = TaskError::non_error();
                tracing::warn!(identifier, "task failed without an error value");
                state.errors.push(err.clone());
                state.settled.push(Err(err));
                self.inner.config.error_delay()
            }
        }
    }
}

impl<T, S> PacedQueue<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn,
{
    /// Wait for quiescence, then resolve with all outcomes in completion
    /// order, or fail with the first captured error.
    ///
    /// Equivalent to [`PacedQueue::drain_with`] under default options:
    /// counters and logs reset before the result is returned, so a subsequent
    /// submit-and-drain cycle starts from a fresh baseline.
    pub async fn drain(&self) -> Result<Vec<T>, TaskError> {
        self.drain_with(DrainOptions::default(), None).await
    }

    /// Wait for quiescence, then resolve with the success values only, in
    /// completion order. Never fails; captured errors are dropped.
    pub async fn drain_successes(&self) -> Vec<T> {
        let (settled, _errors) = self.quiesce_snapshot(true).await;
        settled.into_iter().filter_map(Result::ok).collect()
    }

    /// Like [`PacedQueue::drain_successes`], but when errors were captured
    /// the callback receives the full ordered log exactly once before the
    /// drain resolves.
    pub async fn drain_successes_observing<F>(&self, on_errors: F) -> Vec<T>
    where
        F: FnOnce(Vec<TaskError>) + Send + 'static,
    {
        let (settled, errors) = self.quiesce_snapshot(true).await;
        if !errors.is_empty() {
            on_errors(errors);
        }
        settled.into_iter().filter_map(Result::ok).collect()
    }

    /// Full-control drain.
    ///
    /// Waits until the queue is quiescent: no task pending and every
    /// dispatched task settled, pacing delay included. Detection is a poll
    /// loop with `poll_interval` granularity, so worst-case latency after the
    /// actual quiescence instant is one interval.
    ///
    /// With `only_successes` set the drain never fails and `on_errors` (if
    /// supplied) observes the error log; otherwise `on_errors` is unused and
    /// the first captured error, in settlement order, fails the drain.
    pub async fn drain_with(
        &self,
        options: DrainOptions,
        on_errors: Option<ErrorsObserved>,
    ) -> Result<Vec<T>, TaskError> {
        let (settled, errors) = self.quiesce_snapshot(options.clear_after).await;
        tracing::debug!(
            outcomes = settled.len(),
            errors = errors.len(),
            "queue drained"
        );
        if options.only_successes {
            if !errors.is_empty() {
                if let Some(observe) = on_errors {
                    observe(errors);
                }
            }
            Ok(settled.into_iter().filter_map(Result::ok).collect())
        } else if let Some(first) = errors.into_iter().next() {
            Err(first)
        } else {
            Ok(settled.into_iter().filter_map(Result::ok).collect())
        }
    }

    /// Poll until quiescent, then snapshot outcomes and errors under the same
    /// lock acquisition, optionally resetting state (pending preserved).
    async fn quiesce_snapshot(
        &self,
        clear_after: bool,
    ) -> (Vec<Result<T, TaskError>>, Vec<TaskError>) {
        loop {
            {
                let mut state = self.inner.state.lock();
                if state.quiescent() {
                    let settled = state.settled.clone();
                    let errors = state.errors.clone();
                    if clear_after {
                        state.reset(false);
                    }
                    return (settled, errors);
                }
            }
            pacing(self.inner.config.poll_interval()).await;
        }
    }
}

/// Sleep for a pacing interval; a zero interval still yields so that
/// settlement tasks make progress on single-threaded runtimes.
async fn pacing(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
