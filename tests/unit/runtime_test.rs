//! Tests for tokio spawner utilities

use lane_queue::core::{CommandQueue, EnqueueOptions, QueueError, Spawn};
use lane_queue::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_none());
}

#[test]
fn test_ready_requires_a_runtime() {
    assert!(matches!(
        TokioSpawner::default().ready(),
        Err(QueueError::NoRuntime)
    ));

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    assert!(TokioSpawner::new(runtime.handle().clone()).ready().is_ok());
    runtime.block_on(async { assert!(TokioSpawner::default().ready().is_ok()) });
}

#[test]
fn test_handle_spawner_enqueues_from_plain_thread() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let queue = CommandQueue::with_spawner(TokioSpawner::new(runtime.handle().clone()));

    // Submitting happens outside any runtime context.
    let handle = std::thread::spawn({
        let queue = queue.clone();
        move || {
            queue.submit_in_lane(
                "worker",
                |ctx| async move { Ok(ctx.lane().to_string()) },
                EnqueueOptions::default(),
            )
        }
    })
    .join()
    .unwrap();

    let lane = runtime.block_on(handle.wait()).unwrap();
    assert_eq!(lane, "worker");
}
