// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public event feed.

use crate::Engine;
use derrick_core::{BuildId, Clock, Event, Result};

/// Hard ceiling on one event page.
pub const MAX_EVENT_PAGE: usize = 1000;

impl<C: Clock> Engine<C> {
    /// Events of a build with sequence greater than `last_seen`, ascending,
    /// at most `limit` (clamped). Consumers long-poll by re-requesting with
    /// the highest sequence they have seen.
    ///
    /// Produces `NotFound` for unknown builds.
    pub fn get_events(
        &self,
        build_id: BuildId,
        last_seen: u64,
        limit: usize,
    ) -> Result<Vec<Event>> {
        let limit = limit.clamp(1, MAX_EVENT_PAGE);
        self.store().read(|db| {
            db.read_build(build_id)?;
            Ok(db.events_after(build_id, last_seen, limit))
        })
    }
}
