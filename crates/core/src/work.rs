// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted async work items and their shared processing state.

use crate::id::ResourceKind;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a work item.
    pub struct WorkItemId(ResourceKind::WorkItem);
}

crate::define_id! {
    /// Unique identifier for a work-item state.
    pub struct WorkItemStateId(ResourceKind::WorkItemState);
}

/// Lifecycle of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

crate::simple_display! {
    WorkItemStatus {
        Queued => "queued",
        Processing => "processing",
        Succeeded => "succeeded",
        Failed => "failed",
    }
}

impl WorkItemStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkItemStatus::Succeeded | WorkItemStatus::Failed)
    }
}

/// One persisted async task, processed by the handler registered for its
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    /// Selects the registered handler.
    pub item_type: String,
    /// Opaque handler-specific payload.
    pub data: serde_json::Value,
    /// Items sharing a non-empty key are processed serially, one at a time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency_key: Option<String>,
    pub status: WorkItemStatus,
    /// The state object this item is drained through. Items sharing a
    /// concurrency key share one state.
    pub state_id: WorkItemStateId,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { WorkItem, WorkItemId, ResourceKind::WorkItem }

impl WorkItem {
    pub fn new(item_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: WorkItemId::new(),
            item_type: item_type.into(),
            data,
            concurrency_key: None,
            status: WorkItemStatus::Queued,
            state_id: WorkItemStateId::empty(),
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    pub fn with_concurrency_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.is_empty() {
            self.concurrency_key = Some(key);
        }
        self
    }
}

/// Processing state shared by every work item with the same concurrency key.
///
/// Allocating the state row leases the processing slot: no other processor
/// may touch any item attached to it until the lease expires or is
/// released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemState {
    pub id: WorkItemStateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency_key: Option<String>,
    pub attempts_so_far: u32,
    /// Earliest time the next attempt may start (backoff).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_at_ms: Option<u64>,
    /// Processor currently holding the lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_to: Option<String>,
    /// Lease expiry; the authoritative handler timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_until_ms: Option<u64>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { WorkItemState, WorkItemStateId, ResourceKind::WorkItemState }

impl WorkItemState {
    pub fn new(concurrency_key: Option<String>) -> Self {
        Self {
            id: WorkItemStateId::new(),
            concurrency_key,
            attempts_so_far: 0,
            not_before_ms: None,
            allocated_at_ms: None,
            allocated_to: None,
            allocated_until_ms: None,
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    /// Whether this state may be allocated at `now_ms`.
    pub fn allocatable_at(&self, now_ms: u64) -> bool {
        self.not_before_ms.is_none_or(|t| t <= now_ms)
            && self.allocated_until_ms.is_none_or(|t| t < now_ms)
    }

    /// Clear the allocation fields after a processing attempt.
    pub fn release(&mut self) {
        self.allocated_at_ms = None;
        self.allocated_to = None;
        self.allocated_until_ms = None;
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
