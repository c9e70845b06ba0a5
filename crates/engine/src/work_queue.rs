// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic work queue: persisted async work items with per-key serial
//! processing, pluggable handlers, retry backoff and retention policies.

use crate::backoff::BackoffPolicy;
use async_trait::async_trait;
use derrick_core::{Clock, Result, WorkItem, WorkItemStateId, WorkItemStatus};
use derrick_store::Store;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A handler failure, classified by the handler itself. The backoff policy
/// makes the final retry/give-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub message: String,
    pub can_retry: bool,
}

impl HandlerError {
    pub fn retryable(message: impl std::fmt::Display) -> Self {
        Self { message: message.to_string(), can_retry: true }
    }

    pub fn permanent(message: impl std::fmt::Display) -> Self {
        Self { message: message.to_string(), can_retry: false }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Behaviour for one work-item type.
#[async_trait]
pub trait WorkItemHandler: Send + Sync {
    async fn handle(&self, item: WorkItem) -> HandlerResult;
}

#[derive(Clone)]
struct Registration {
    handler: Arc<dyn WorkItemHandler>,
    timeout: Duration,
    backoff: BackoffPolicy,
    keep_failed: bool,
    keep_succeeded: bool,
}

enum Outcome {
    Succeeded,
    Failed { message: String, can_retry: bool },
}

/// The work queue over the store. Processors share it behind an `Arc`.
pub struct WorkQueue<C: Clock> {
    store: Store,
    clock: C,
    poll_interval: Duration,
    handlers: RwLock<HashMap<String, Registration>>,
}

impl<C: Clock> WorkQueue<C> {
    pub fn new(store: Store, clock: C, poll_interval: Duration) -> Self {
        Self { store, clock, poll_interval, handlers: RwLock::new(HashMap::new()) }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Persist a work item. Items sharing a non-empty concurrency key
    /// attach to one state and drain serially. Submission never requires
    /// the handler to be registered yet: items wait until it is.
    pub fn submit(&self, item: WorkItem) -> Result<WorkItem> {
        let now = self.clock.epoch_ms();
        self.store.write(|db| db.add_work_item(item, now))
    }

    /// Install the behaviour for an item type. Items persisted before
    /// registration are picked up on the next processor pass.
    pub fn register_handler(
        &self,
        item_type: impl Into<String>,
        handler: Arc<dyn WorkItemHandler>,
        timeout: Duration,
        backoff: BackoffPolicy,
        keep_failed: bool,
        keep_succeeded: bool,
    ) {
        let item_type = item_type.into();
        tracing::debug!(item_type = %item_type, "work-queue handler registered");
        self.handlers.write().insert(
            item_type,
            Registration { handler, timeout, backoff, keep_failed, keep_succeeded },
        );
    }

    /// Allocate the oldest ready state with a registered, queued item.
    ///
    /// Allocation both leases the state (until `now + timeout`) and marks
    /// the chosen item `processing`, so no two processors ever run items
    /// sharing a concurrency key simultaneously. States whose next item has
    /// no handler yet are skipped, not failed.
    fn allocate(&self, processor: &str) -> Result<Option<(WorkItem, Registration)>> {
        let now = self.clock.epoch_ms();
        let handlers = self.handlers.read().clone();
        self.store.write(|db| {
            for state in db.ready_work_states(now) {
                let Some(mut item) = db.oldest_pending_item_for_state(state.id) else {
                    continue;
                };
                let Some(registration) = handlers.get(&item.item_type) else {
                    continue;
                };
                let until = now + registration.timeout.as_millis() as u64;
                db.allocate_work_state(state.id, processor, now, until)?;
                item.status = WorkItemStatus::Processing;
                db.put_work_item(item.clone());
                return Ok(Some((item, registration.clone())));
            }
            Ok(None)
        })
    }

    fn complete(
        &self,
        state_id: WorkItemStateId,
        item: WorkItem,
        registration: &Registration,
        outcome: Outcome,
    ) -> Result<()> {
        let now = self.clock.epoch_ms();
        self.store.write(|db| {
            let mut state = db.read_work_state(state_id)?;
            let mut item = db.read_work_item(item.id)?;
            state.release();

            let keep = match outcome {
                Outcome::Succeeded => {
                    item.status = WorkItemStatus::Succeeded;
                    state.attempts_so_far = 0;
                    state.not_before_ms = None;
                    registration.keep_succeeded
                }
                Outcome::Failed { ref message, can_retry } => {
                    state.attempts_so_far += 1;
                    let next = can_retry
                        .then(|| {
                            registration.backoff.next_attempt_ms(state.attempts_so_far, now)
                        })
                        .flatten();
                    match next {
                        Some(not_before_ms) => {
                            // Retry: the item goes back to queued and the
                            // state's backoff gate defers it.
                            tracing::debug!(
                                item = %item.id,
                                attempts = state.attempts_so_far,
                                not_before_ms,
                                error = %message,
                                "work item will retry"
                            );
                            item.status = WorkItemStatus::Queued;
                            state.not_before_ms = Some(not_before_ms);
                            db.put_work_item(item);
                            db.put_work_state(state);
                            return Ok(());
                        }
                        None => {
                            tracing::warn!(
                                item = %item.id,
                                item_type = %item.item_type,
                                error = %message,
                                "work item failed permanently"
                            );
                            item.status = WorkItemStatus::Failed;
                            state.attempts_so_far = 0;
                            state.not_before_ms = None;
                            registration.keep_failed
                        }
                    }
                }
            };

            if keep {
                db.put_work_item(item);
            } else {
                db.delete_work_item(item.id)?;
            }

            // The state lives exactly as long as items reference it: kept
            // terminal items pin it (the mixed-retention rule), a drained
            // key-sharing state with queued items left keeps draining.
            if db.items_for_state(state_id).is_empty() {
                db.delete_work_state(state_id)?;
            } else {
                db.put_work_state(state);
            }
            Ok(())
        })
    }

    /// Take and run one work item. Returns whether anything was processed.
    ///
    /// The handler runs outside any store transaction, bounded by its
    /// registered timeout; hitting the timeout counts as a retryable
    /// failure, mirroring the allocation lease expiring.
    pub async fn process_one(&self, processor: &str) -> Result<bool> {
        let Some((item, registration)) = self.allocate(processor)? else {
            return Ok(false);
        };
        let state_id = item.state_id;

        let outcome =
            match tokio::time::timeout(registration.timeout, registration.handler.handle(item.clone()))
                .await
            {
                Ok(Ok(())) => Outcome::Succeeded,
                Ok(Err(e)) => Outcome::Failed { message: e.message, can_retry: e.can_retry },
                Err(_) => Outcome::Failed {
                    message: "allocation expired".to_string(),
                    can_retry: true,
                },
            };

        self.complete(state_id, item, &registration, outcome)?;
        Ok(true)
    }

    /// Drain everything currently processable. Deterministic entry point
    /// for tests and shutdown flushes; returns the number of items run.
    pub async fn process_available(&self, processor: &str) -> Result<usize> {
        let mut processed = 0;
        while self.process_one(processor).await? {
            processed += 1;
        }
        Ok(processed)
    }

    /// Spawn `n` processor loops. Each loop retries allocation after
    /// `poll_interval` when idle and exits on cancellation.
    pub fn spawn_processors(self: &Arc<Self>, n: usize, cancel: CancellationToken) {
        let pool_id = uuid::Uuid::new_v4();
        for i in 0..n {
            let queue = Arc::clone(self);
            let cancel = cancel.clone();
            let processor = format!("{pool_id}-{i}");
            tokio::spawn(async move {
                queue.run_processor(&processor, cancel).await;
            });
        }
    }

    async fn run_processor(&self, processor: &str, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }
            match self.process_one(processor).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(processor, error = %e, "work-queue pass failed");
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "work_queue_tests.rs"]
mod tests;
