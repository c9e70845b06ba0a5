// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over work items and their shared processing states.

use crate::db::Database;
use derrick_core::{Result, WorkItem, WorkItemState, WorkItemStateId, WorkItemStatus};

impl Database {
    /// Persist a work item together with its state.
    ///
    /// An item carrying a non-empty concurrency key attaches to the state
    /// of any existing non-terminal item with the same key, so one
    /// processor drains all of them serially; otherwise a fresh state row
    /// is created.
    pub fn add_work_item(&mut self, mut item: WorkItem, now_ms: u64) -> Result<WorkItem> {
        let shared_state = item.concurrency_key.as_deref().and_then(|key| {
            self.work_items
                .iter_live()
                .find(|i| {
                    i.concurrency_key.as_deref() == Some(key) && !i.status.is_terminal()
                })
                .map(|i| i.state_id)
        });

        item.state_id = match shared_state {
            Some(state_id) => state_id,
            None => {
                let state = WorkItemState::new(item.concurrency_key.clone());
                self.work_item_states.create(state, now_ms)?.id
            }
        };
        self.work_items.create(item, now_ms)
    }

    /// States ready for allocation at `now_ms`: backoff elapsed and no live
    /// lease. Oldest first.
    pub fn ready_work_states(&self, now_ms: u64) -> Vec<WorkItemState> {
        let mut states: Vec<WorkItemState> = self
            .work_item_states
            .iter_live()
            .filter(|s| s.allocatable_at(now_ms))
            .cloned()
            .collect();
        states.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        states
    }

    /// The oldest non-terminal item of a state.
    ///
    /// Includes items stuck in `processing`: a processor that died holding
    /// the lease leaves its item mid-flight, and the next allocation after
    /// lease expiry must pick it back up.
    pub fn oldest_pending_item_for_state(&self, state_id: WorkItemStateId) -> Option<WorkItem> {
        let mut items: Vec<&WorkItem> = self
            .work_items
            .iter_live()
            .filter(|i| i.state_id == state_id && !i.status.is_terminal())
            .collect();
        items.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        items.first().cloned().cloned()
    }

    /// Every live item attached to a state.
    pub fn items_for_state(&self, state_id: WorkItemStateId) -> Vec<WorkItem> {
        let mut items: Vec<WorkItem> = self
            .work_items
            .iter_live()
            .filter(|i| i.state_id == state_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        items
    }

    /// Lease a state to a processor until `until_ms`.
    pub fn allocate_work_state(
        &mut self,
        state_id: WorkItemStateId,
        processor: &str,
        now_ms: u64,
        until_ms: u64,
    ) -> Result<WorkItemState> {
        let mut state = self.work_item_states.read(state_id)?;
        state.allocated_at_ms = Some(now_ms);
        state.allocated_to = Some(processor.to_string());
        state.allocated_until_ms = Some(until_ms);
        self.work_item_states.put_immutable(state.clone());
        Ok(state)
    }

    pub fn read_work_state(&self, id: WorkItemStateId) -> Result<WorkItemState> {
        self.work_item_states.read(id)
    }

    pub fn read_work_item(&self, id: derrick_core::WorkItemId) -> Result<WorkItem> {
        self.work_items.read(id)
    }

    pub fn put_work_state(&mut self, state: WorkItemState) {
        self.work_item_states.put_immutable(state);
    }

    pub fn delete_work_state(&mut self, id: WorkItemStateId) -> Result<()> {
        self.work_item_states.delete(id)
    }

    pub fn put_work_item(&mut self, item: WorkItem) {
        self.work_items.put_immutable(item);
    }

    pub fn delete_work_item(&mut self, id: derrick_core::WorkItemId) -> Result<()> {
        self.work_items.delete(id)
    }

    /// Items currently marked processing, for the §8 invariant checks and
    /// operator introspection.
    pub fn processing_work_items(&self) -> Vec<WorkItem> {
        self.work_items
            .iter_live()
            .filter(|i| i.status == WorkItemStatus::Processing)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
