// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-feed message bodies.

use derrick_core::Event;
use serde::{Deserialize, Serialize};

/// Query string of an event poll: `?last={n}&limit={k}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsQuery {
    /// Highest sequence number the consumer has already seen.
    #[serde(default)]
    pub last: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// One page of a build's event feed, ascending by sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsPage {
    pub events: Vec<Event>,
}

impl EventsPage {
    /// The cursor for the next poll: the highest sequence in this page,
    /// or the caller's previous cursor when the page is empty.
    pub fn next_last(&self, previous: u64) -> u64 {
        self.events.last().map(|e| e.sequence).unwrap_or(previous)
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
