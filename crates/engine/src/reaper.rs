// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The timeout reaper: a long-lived sweep force-failing jobs that sat too
//! long since being queued.

use crate::status::{maintain_build_status, publish_job_event, publish_step_event};
use crate::Engine;
use derrick_core::{Clock, Etag, JobId, Result, Status};
use derrick_store::{Database, Store};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

const TIMED_OUT: &str = "job timed out";

struct CheckRequest {
    timeout: Duration,
    reply: oneshot::Sender<usize>,
}

/// Handle to a running reaper task.
///
/// Tests drive sweeps synchronously through [`ReaperHandle::check_for_timeouts`]
/// rather than waiting for the ticker.
pub struct ReaperHandle {
    tx: mpsc::Sender<CheckRequest>,
}

impl ReaperHandle {
    /// Run one sweep with an explicit timeout and return how many jobs were
    /// failed.
    pub async fn check_for_timeouts(&self, timeout: Duration) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CheckRequest { timeout, reply })
            .await
            .map_err(|_| derrick_core::Error::internal("reaper stopped"))?;
        rx.await.map_err(|_| derrick_core::Error::internal("reaper stopped"))
    }
}

impl<C: Clock> Engine<C> {
    /// Spawn the reaper loop: a periodic sweep plus a request channel for
    /// explicit sweeps.
    pub fn spawn_reaper(&self, cancel: CancellationToken) -> ReaperHandle {
        let (tx, mut rx) = mpsc::channel::<CheckRequest>(8);
        let store = self.store().clone();
        let clock = self.clock().clone();
        let poll_interval = self.config().timeout_poll_interval;
        let default_timeout = self.config().job_timeout;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; consume
            // it so the first sweep happens one interval in.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        sweep(&store, &clock, default_timeout);
                    }
                    request = rx.recv() => {
                        let Some(request) = request else { break };
                        let count = sweep(&store, &clock, request.timeout);
                        let _ = request.reply.send(count);
                    }
                }
            }
        });

        ReaperHandle { tx }
    }
}

/// One sweep: page through every non-finished job and fail the ones whose
/// age since queueing exceeds `timeout`. Each job fails in its own
/// transaction; one failure never aborts the sweep.
fn sweep<C: Clock>(store: &Store, clock: &C, timeout: Duration) -> usize {
    let now = clock.epoch_ms();
    let cutoff_ms = timeout.as_millis() as u64;
    let mut failed = 0;

    for status in [Status::Queued, Status::Submitted, Status::Running] {
        let jobs = store.read(|db| db.jobs_with_status(status));
        for job in jobs {
            let queued_at = job.timings.queued_at_ms.unwrap_or(job.created_at_ms);
            if now.saturating_sub(queued_at) <= cutoff_ms {
                continue;
            }
            match store.write(|db| fail_timed_out_job(db, job.id, now)) {
                Ok(true) => failed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(job = %job.id, error = %e, "failed to time out job");
                }
            }
        }
    }

    if failed > 0 {
        tracing::info!(failed, "timeout sweep failed jobs");
    }
    failed
}

/// Fail one job and its unfinished steps. Returns false when the job
/// finished in the meantime.
fn fail_timed_out_job(db: &mut Database, job_id: JobId, now_ms: u64) -> Result<bool> {
    let mut job = db.read_job_for_update(job_id)?;
    if job.status.is_finished() {
        return Ok(false);
    }
    job.status = Status::Failed;
    job.error = Some(TIMED_OUT.to_string());
    job.timings.stamp(Status::Failed, now_ms);
    db.seal_log(job.log_descriptor_id);
    let job = db.update_job(job, &Etag::wildcard())?;
    publish_job_event(db, &job, now_ms);

    for mut step in db.steps_for_job(job.id) {
        if step.status.is_finished() {
            continue;
        }
        step.status = Status::Failed;
        step.error = Some(TIMED_OUT.to_string());
        step.timings.stamp(Status::Failed, now_ms);
        db.seal_log(step.log_descriptor_id);
        let step = db.update_step(step, &Etag::wildcard())?;
        publish_step_event(db, &job, &step, now_ms);
    }

    maintain_build_status(db, job.build_id, now_ms)?;
    Ok(true)
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
