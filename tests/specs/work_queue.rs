// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic work-queue scenarios over the public surface.

use async_trait::async_trait;
use derrick_core::{FakeClock, WorkItem, WorkItemStatus};
use derrick_engine::{BackoffPolicy, HandlerError, HandlerResult, WorkItemHandler, WorkQueue};
use derrick_store::Store;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct OutcomeByPayload {
    calls: AtomicUsize,
}

#[async_trait]
impl WorkItemHandler for OutcomeByPayload {
    async fn handle(&self, item: WorkItem) -> HandlerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match item.data.get("outcome").and_then(|v| v.as_str()) {
            Some("fail") => Err(HandlerError::permanent("told to fail")),
            _ => Ok(()),
        }
    }
}

fn queue() -> (Arc<WorkQueue<FakeClock>>, Arc<OutcomeByPayload>, FakeClock) {
    let clock = FakeClock::new();
    let queue = Arc::new(WorkQueue::new(
        Store::new(),
        clock.clone(),
        Duration::from_millis(10),
    ));
    let handler = Arc::new(OutcomeByPayload { calls: AtomicUsize::new(0) });
    (queue, handler, clock)
}

#[tokio::test]
async fn mixed_retention_under_one_key_keeps_the_state() {
    let (queue, handler, _clock) = queue();
    // keep_failed = false, keep_succeeded = true.
    queue.register_handler(
        "side-effect",
        handler.clone(),
        Duration::from_secs(5),
        BackoffPolicy::no_retry(),
        false,
        true,
    );

    let ok = queue
        .submit(
            WorkItem::new("side-effect", serde_json::json!({"outcome": "ok"}))
                .with_concurrency_key("K"),
        )
        .unwrap();
    let failed = queue
        .submit(
            WorkItem::new("side-effect", serde_json::json!({"outcome": "fail"}))
                .with_concurrency_key("K"),
        )
        .unwrap();
    assert_eq!(ok.state_id, failed.state_id);

    queue.process_available("spec").await.unwrap();
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);

    // The failed item was configured away; the kept succeeded item pins
    // the state row.
    queue.store().read(|db| {
        let state = db.read_work_state(ok.state_id).unwrap();
        let items = db.items_for_state(state.id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ok.id);
        assert_eq!(items[0].status, WorkItemStatus::Succeeded);
    });
}

#[tokio::test]
async fn items_submitted_before_registration_still_process() {
    let (queue, handler, _clock) = queue();
    queue
        .submit(WorkItem::new("side-effect", serde_json::json!({"outcome": "ok"})))
        .unwrap();

    assert_eq!(queue.process_available("spec").await.unwrap(), 0);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

    queue.register_handler(
        "side-effect",
        handler.clone(),
        Duration::from_secs(5),
        BackoffPolicy::no_retry(),
        false,
        false,
    );
    assert_eq!(queue.process_available("spec").await.unwrap(), 1);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrency_key_items_never_process_together() {
    let (queue, handler, _clock) = queue();
    queue.register_handler(
        "side-effect",
        handler.clone(),
        Duration::from_secs(5),
        BackoffPolicy::no_retry(),
        false,
        false,
    );

    for _ in 0..3 {
        queue
            .submit(
                WorkItem::new("side-effect", serde_json::json!({"outcome": "ok"}))
                    .with_concurrency_key("K"),
            )
            .unwrap();
    }

    // After each single step, at most one item is mid-flight.
    while queue.process_one("spec").await.unwrap() {
        queue.store().read(|db| {
            assert!(db.processing_work_items().len() <= 1);
        });
    }
    assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
}
