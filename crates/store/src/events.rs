// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-build event log.

use crate::db::Database;
use derrick_core::{BuildId, Event};

impl Database {
    /// Allocate the build's next sequence number and append the event.
    ///
    /// Callers invoke this inside the same write transaction as the state
    /// change the event describes, so the event becomes visible exactly
    /// when the state change commits. The counter bump is the in-memory
    /// equivalent of `UPDATE … SET counter = counter + 1 RETURNING`.
    pub fn publish_event(&mut self, mut event: Event, now_ms: u64) -> Event {
        let counter = self.event_counters.entry(event.build_id).or_insert(0);
        *counter += 1;
        event.sequence = *counter;
        if event.created_at_ms == 0 {
            event.created_at_ms = now_ms;
        }
        self.events.push(event.clone());
        event
    }

    /// Events of a build with `sequence > last_seen`, ascending, at most
    /// `limit`. Consumers long-poll by re-requesting with the highest
    /// sequence they have seen.
    pub fn events_after(&self, build_id: BuildId, last_seen: u64, limit: usize) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.build_id == build_id && e.sequence > last_seen)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.sequence);
        events.truncate(limit);
        events
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
