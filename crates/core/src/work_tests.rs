// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_concurrency_key_is_dropped() {
    let item = WorkItem::new("notify", serde_json::json!({})).with_concurrency_key("");
    assert!(item.concurrency_key.is_none());

    let item = WorkItem::new("notify", serde_json::json!({})).with_concurrency_key("repo-1");
    assert_eq!(item.concurrency_key.as_deref(), Some("repo-1"));
}

#[yare::parameterized(
    queued = { WorkItemStatus::Queued, false },
    processing = { WorkItemStatus::Processing, false },
    succeeded = { WorkItemStatus::Succeeded, true },
    failed = { WorkItemStatus::Failed, true },
)]
fn terminal_statuses(status: WorkItemStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn fresh_state_is_allocatable() {
    let state = WorkItemState::new(None);
    assert!(state.allocatable_at(0));
    assert!(state.allocatable_at(u64::MAX));
}

#[test]
fn backoff_defers_allocation() {
    let mut state = WorkItemState::new(None);
    state.not_before_ms = Some(1_000);
    assert!(!state.allocatable_at(999));
    assert!(state.allocatable_at(1_000));
}

#[test]
fn live_lease_blocks_allocation() {
    let mut state = WorkItemState::new(None);
    state.allocated_until_ms = Some(5_000);
    assert!(!state.allocatable_at(5_000));
    assert!(state.allocatable_at(5_001));
}

#[test]
fn release_clears_the_lease() {
    let mut state = WorkItemState::new(Some("k".to_string()));
    state.allocated_at_ms = Some(1);
    state.allocated_to = Some("proc".to_string());
    state.allocated_until_ms = Some(100);
    state.release();
    assert!(state.allocated_at_ms.is_none());
    assert!(state.allocated_to.is_none());
    assert!(state.allocated_until_ms.is_none());
}
