//! Tests for utility functions

use lane_queue::core::{CommandQueue, EnqueueOptions};
use lane_queue::util::{init_tracing, init_tracing_with};

#[tokio::test]
async fn test_init_tracing_is_idempotent() {
    init_tracing_with("lane_queue=debug");
    init_tracing();
    init_tracing_with("not a [valid directive");

    // Events are emitted through the installed subscriber without panicking.
    let queue = CommandQueue::new();
    let n = queue
        .enqueue(|_ctx| async { Ok(1) }, EnqueueOptions::default())
        .await
        .unwrap();
    assert_eq!(n, 1);
}
