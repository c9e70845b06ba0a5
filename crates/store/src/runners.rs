// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over registered runners.

use crate::db::Database;
use derrick_core::{Error, Etag, Job, LegalEntityId, Result, Runner, RunnerId};

impl Database {
    /// Insert a runner, owned by its legal entity. `name` is unique within
    /// the entity among non-deleted runners.
    pub fn insert_runner(&mut self, runner: Runner, now_ms: u64) -> Result<Runner> {
        self.legal_entities.read(runner.legal_entity_id)?;
        if self
            .runners
            .iter_live()
            .any(|r| r.legal_entity_id == runner.legal_entity_id && r.name == runner.name)
        {
            return Err(Error::already_exists(format!("runner '{}'", runner.name)));
        }
        let runner = self.runners.create(runner, now_ms)?;
        self.create_ownership(runner.legal_entity_id, runner.id, now_ms)?;
        Ok(runner)
    }

    pub fn read_runner(&self, id: RunnerId) -> Result<Runner> {
        self.runners.read(id)
    }

    /// Compare-and-swap update of a runner.
    pub fn update_runner(&mut self, runner: Runner, expected: &Etag) -> Result<Runner> {
        self.runners.update(runner, expected)
    }

    pub fn soft_delete_runner(&mut self, id: RunnerId, now_ms: u64) -> Result<()> {
        self.runners.soft_delete(id, now_ms)
    }

    /// Live runners owned by a legal entity.
    pub fn runners_for_entity(&self, legal_entity_id: LegalEntityId) -> Vec<Runner> {
        let mut runners: Vec<Runner> = self
            .runners
            .iter_live()
            .filter(|r| r.legal_entity_id == legal_entity_id)
            .cloned()
            .collect();
        runners.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        runners
    }

    /// Whether any live, enabled runner of the entity can execute `job`.
    /// Jobs failing this check are placed directly into `failed` at enqueue
    /// time.
    pub fn any_capable_runner(&self, legal_entity_id: LegalEntityId, job: &Job) -> bool {
        self.runners
            .iter_live()
            .any(|r| r.legal_entity_id == legal_entity_id && r.can_run(job))
    }
}
