// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM notification: build status changes fan out to the source-control
//! system through the work queue, never blocking state updates.

use crate::backoff::BackoffPolicy;
use crate::work_queue::{HandlerError, HandlerResult, WorkItemHandler, WorkQueue};
use async_trait::async_trait;
use derrick_core::{
    Build, BuildId, Clock, Commit, CommitId, Repo, RepoId, Result, Status, WorkItem,
};
use derrick_store::{Database, Store};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Work-item type for build status notifications.
pub const SCM_NOTIFY_TYPE: &str = "scm-notify";

/// Pushes build status to the source-control system (commit statuses,
/// check runs). External collaborator; failures are logged and swallowed,
/// never surfaced into the state machine.
#[async_trait]
pub trait ScmNotifier: Send + Sync {
    async fn notify_build_updated(
        &self,
        repo: &Repo,
        commit: &Commit,
        build: &Build,
    ) -> Result<()>;
}

/// Notifier that drops everything. The default when no SCM is wired up.
#[derive(Default)]
pub struct NullScmNotifier;

#[async_trait]
impl ScmNotifier for NullScmNotifier {
    async fn notify_build_updated(&self, _: &Repo, _: &Commit, _: &Build) -> Result<()> {
        Ok(())
    }
}

/// Notifier that records what it was asked to send, for tests.
#[derive(Default)]
pub struct RecordingScmNotifier {
    notifications: Mutex<Vec<(RepoId, CommitId, BuildId, Status)>>,
}

impl RecordingScmNotifier {
    pub fn notifications(&self) -> Vec<(RepoId, CommitId, BuildId, Status)> {
        self.notifications.lock().clone()
    }
}

#[async_trait]
impl ScmNotifier for RecordingScmNotifier {
    async fn notify_build_updated(&self, repo: &Repo, commit: &Commit, build: &Build) -> Result<()> {
        self.notifications.lock().push((repo.id, commit.id, build.id, build.status));
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NotifyPayload {
    build_id: BuildId,
}

/// Queue a notification for a build's current status. Called inside the
/// transaction that changed the status; the commit id is the concurrency
/// key so notifications for one commit stay ordered.
pub(crate) fn enqueue_notification(db: &mut Database, build: &Build, now_ms: u64) -> Result<()> {
    let payload = serde_json::to_value(NotifyPayload { build_id: build.id })
        .map_err(|e| derrick_core::Error::internal(e))?;
    let item = WorkItem::new(SCM_NOTIFY_TYPE, payload)
        .with_concurrency_key(build.commit_id.as_str());
    db.add_work_item(item, now_ms)?;
    Ok(())
}

struct ScmNotifyHandler {
    store: Store,
    notifier: Arc<dyn ScmNotifier>,
}

#[async_trait]
impl WorkItemHandler for ScmNotifyHandler {
    async fn handle(&self, item: WorkItem) -> HandlerResult {
        let payload: NotifyPayload =
            serde_json::from_value(item.data).map_err(HandlerError::permanent)?;

        let loaded = self.store.read(|db| {
            let build = db.read_build(payload.build_id)?;
            let repo = db.read_repo(build.repo_id)?;
            let commit = db.read_commit(build.commit_id)?;
            Ok::<_, derrick_core::Error>((repo, commit, build))
        });
        let (repo, commit, build) = match loaded {
            Ok(ok) => ok,
            // The build vanished; nothing left to notify about.
            Err(e) => return Err(HandlerError::permanent(e)),
        };

        match self.notifier.notify_build_updated(&repo, &commit, &build).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(build = %build.id, error = %e, "scm notification failed");
                Err(HandlerError::retryable(e))
            }
        }
    }
}

/// Install the SCM handler: modest timeout, exponential backoff, nothing
/// retained after the final outcome.
pub(crate) fn register<C: Clock>(
    queue: &WorkQueue<C>,
    store: Store,
    notifier: Arc<dyn ScmNotifier>,
) {
    queue.register_handler(
        SCM_NOTIFY_TYPE,
        Arc::new(ScmNotifyHandler { store, notifier }),
        Duration::from_secs(30),
        BackoffPolicy::exponential(5, Duration::from_secs(1), Duration::from_secs(60)),
        false,
        false,
    );
}

#[cfg(test)]
#[path = "scm_tests.rs"]
mod tests;
