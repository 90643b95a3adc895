//! Integration tests for drain aggregation and error capture semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use paced_queue::config::QueueConfig;
use paced_queue::core::{DrainOptions, PacedQueue, TaskUnit, NON_ERROR_FAILURE_MESSAGE};
use parking_lot::Mutex;

fn success(value: u32, millis: u64) -> TaskUnit<u32> {
    TaskUnit::new(move || async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(value)
    })
}

fn failure(message: &'static str, millis: u64) -> TaskUnit<u32> {
    TaskUnit::new(move || async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Err(anyhow::anyhow!(message))
    })
}

#[tokio::test]
async fn drain_on_fresh_queue_resolves_empty() {
    let queue: PacedQueue<u32> = PacedQueue::new(QueueConfig::new());
    let results = queue.drain().await.unwrap();
    assert!(results.is_empty());
    assert_eq!(queue.completed_count(), 0);
}

#[tokio::test]
async fn drain_composes_like_a_fresh_queue() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new()
            .with_capacity(1)
            .with_success_delay(Duration::from_millis(20)),
    );

    queue.submit_task(success(1, 5));
    let first = queue.drain().await.unwrap();
    assert_eq!(first, vec![1]);
    assert_eq!(queue.completed_count(), 0);
    assert_eq!(queue.error_count(), 0);

    queue.submit_task(success(2, 5));
    let second = queue.drain().await.unwrap();
    assert_eq!(second, vec![2]);
    assert_eq!(queue.completed_count(), 0);
}

#[tokio::test]
async fn default_drain_fails_with_first_captured_error() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new()
            .with_capacity(1)
            .with_success_delay(Duration::from_millis(10)),
    );

    queue.submit_all([
        success(1, 5),
        failure("error 2", 5),
        success(3, 5),
    ]);

    let err = queue.drain().await.unwrap_err();
    assert_eq!(err.to_string(), "error 2");

    // The default drain cleared state before settling.
    assert_eq!(queue.running_count(), 0);
    assert_eq!(queue.completed_count(), 0);
    assert_eq!(queue.error_count(), 0);
}

#[tokio::test]
async fn failures_do_not_halt_subsequent_dispatch() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new()
            .with_capacity(1)
            .with_success_delay(Duration::from_millis(5)),
    );

    queue.submit_all([failure("early failure", 5), success(7, 5), success(8, 5)]);

    let results = queue.drain_successes().await;
    assert_eq!(results, vec![7, 8]);
}

#[tokio::test]
async fn only_successes_drain_filters_and_observes_errors() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new()
            .with_capacity(3)
            .with_success_delay(Duration::from_millis(10)),
    );

    queue.submit_all([
        success(1, 5),
        failure("first failure", 10),
        success(2, 15),
        failure("second failure", 20),
        success(3, 25),
    ]);

    let calls = Arc::new(AtomicUsize::new(0));
    let observed = Arc::new(Mutex::new(Vec::new()));

    let results = {
        let calls = Arc::clone(&calls);
        let observed = Arc::clone(&observed);
        queue
            .drain_successes_observing(move |errors| {
                calls.fetch_add(1, Ordering::AcqRel);
                *observed.lock() = errors;
            })
            .await
    };

    assert_eq!(results, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::Acquire), 1);

    let errors = observed.lock();
    assert_eq!(errors.len(), 2);
    // Error log follows settlement order.
    assert_eq!(errors[0].to_string(), "first failure");
    assert_eq!(errors[1].to_string(), "second failure");
}

#[tokio::test]
async fn observer_is_not_invoked_without_errors() {
    let queue: PacedQueue<u32> = PacedQueue::new(QueueConfig::new());
    queue.submit_task(success(1, 1));

    let calls = Arc::new(AtomicUsize::new(0));
    let results = {
        let calls = Arc::clone(&calls);
        queue
            .drain_successes_observing(move |_| {
                calls.fetch_add(1, Ordering::AcqRel);
            })
            .await
    };

    assert_eq!(results, vec![1]);
    assert_eq!(calls.load(Ordering::Acquire), 0);
}

#[tokio::test]
async fn panicking_task_gets_fixed_placeholder_error() {
    let queue: PacedQueue<u32> = PacedQueue::new(QueueConfig::new());

    queue.submit(|| async { panic!("raw payload") });

    let err = queue.drain().await.unwrap_err();
    assert_eq!(err.to_string(), NON_ERROR_FAILURE_MESSAGE);
    assert_ne!(err.to_string(), "raw payload");
}

#[tokio::test]
async fn drain_without_clear_preserves_outcomes() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new().with_success_delay(Duration::from_millis(5)),
    );

    queue.submit_task(success(42, 5));

    let opts = DrainOptions {
        only_successes: false,
        clear_after: false,
    };
    let first = queue.drain_with(opts, None).await.unwrap();
    assert_eq!(first, vec![42]);
    assert_eq!(queue.completed_count(), 1);

    // Without a clear, a second drain sees the same aggregate.
    let second = queue.drain_with(opts, None).await.unwrap();
    assert_eq!(second, vec![42]);

    queue.clear(false);
    assert_eq!(queue.completed_count(), 0);
    let third = queue.drain().await.unwrap();
    assert!(third.is_empty());
}

#[tokio::test]
async fn error_delay_paces_failed_settlements() {
    let queue: PacedQueue<u32> = PacedQueue::new(
        QueueConfig::new()
            .with_capacity(1)
            .with_success_delay(Duration::from_millis(5))
            .with_error_delay(Duration::from_millis(80)),
    );

    let started = std::time::Instant::now();
    queue.submit_all([failure("slow lane", 1), failure("slow lane too", 1)]);

    let results = queue.drain_successes().await;
    let elapsed = started.elapsed();

    assert!(results.is_empty());
    assert!(
        elapsed >= Duration::from_millis(160),
        "error pacing not applied: {elapsed:?}"
    );
}
