// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! derrick-engine: the orchestration engine for Derrick
//!
//! Enqueue, dispatch, status roll-up, fingerprint indirection, timeout
//! reaping, the event feed, the runner registry, the generic work queue and
//! dynamic build extension, all over the transactional store.

mod backoff;
mod dequeue;
mod enqueue;
mod events;
mod extend;
mod reaper;
mod runners;
mod scm;
mod status;
#[cfg(test)]
mod test_helpers;
mod token;
mod work_queue;

pub use backoff::BackoffPolicy;
pub use dequeue::RunnableJob;
pub use enqueue::EnqueueRequest;
pub use reaper::ReaperHandle;
pub use runners::{RunnerRegistration, RunnerUpdate};
pub use scm::{NullScmNotifier, RecordingScmNotifier, ScmNotifier, SCM_NOTIFY_TYPE};
pub use work_queue::{HandlerError, HandlerResult, WorkItemHandler, WorkQueue};

use derrick_core::{
    Clock, Commit, CommitId, EngineConfig, LegalEntity, LegalEntityId, Repo, RepoId, Result,
    SystemClock,
};
use derrick_definition::ParserRegistry;
use derrick_store::Store;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The orchestration engine. Cheap to clone pieces hang off `Arc`s; the
/// engine itself is shared behind one.
pub struct Engine<C: Clock = SystemClock> {
    store: Store,
    clock: C,
    config: EngineConfig,
    parsers: ParserRegistry,
    token_secret: Vec<u8>,
    work_queue: Arc<WorkQueue<C>>,
}

impl<C: Clock> Engine<C> {
    pub fn new(store: Store, clock: C, config: EngineConfig) -> Self {
        let work_queue = Arc::new(WorkQueue::new(
            store.clone(),
            clock.clone(),
            config.work_queue_poll_interval,
        ));
        Self {
            store,
            clock,
            config,
            parsers: ParserRegistry::with_defaults(),
            token_secret: nanoid::nanoid!(32).into_bytes(),
            work_queue,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn work_queue(&self) -> &Arc<WorkQueue<C>> {
        &self.work_queue
    }

    pub(crate) fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    pub(crate) fn token_secret(&self) -> &[u8] {
        &self.token_secret
    }

    /// Install the SCM notifier behind the `scm-notify` work-item type and
    /// start nothing: processors pick items up once spawned.
    pub fn set_scm_notifier(&self, notifier: Arc<dyn ScmNotifier>) {
        scm::register(&self.work_queue, self.store.clone(), notifier);
    }

    /// Spawn the timeout reaper and the work-queue processor pool.
    pub fn spawn_background(&self, cancel: CancellationToken) -> ReaperHandle {
        self.work_queue.spawn_processors(self.config.work_queue_processors, cancel.clone());
        self.spawn_reaper(cancel)
    }

    /// Create a legal entity with its standard groups and identity.
    pub fn create_legal_entity(&self, name: &str) -> Result<LegalEntity> {
        let now = self.clock.epoch_ms();
        self.store.write(|db| db.create_legal_entity(name, now))
    }

    /// Create a repo under a legal entity.
    pub fn create_repo(&self, legal_entity_id: LegalEntityId, name: &str) -> Result<Repo> {
        let now = self.clock.epoch_ms();
        self.store.write(|db| db.create_repo(Repo::new(legal_entity_id, name), now))
    }

    /// Record a commit carrying a build-definition document.
    pub fn create_commit(
        &self,
        repo_id: RepoId,
        sha: &str,
        format: &str,
        definition: Vec<u8>,
    ) -> Result<Commit> {
        let now = self.clock.epoch_ms();
        let commit = Commit::new(repo_id, sha).with_definition(format, definition);
        self.store.write(|db| db.create_commit(commit, now))
    }

    pub fn read_commit(&self, id: CommitId) -> Result<Commit> {
        self.store.read(|db| db.read_commit(id))
    }
}
