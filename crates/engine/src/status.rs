// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status maintenance: job/step updates, the build roll-up, and fingerprint
//! indirection.

use crate::scm;
use crate::Engine;
use derrick_core::{
    Clock, Error, Etag, Event, EventKind, Job, JobId, Result, Status, Step, StepId,
};
use derrick_store::Database;

/// Recompute a build's rolled-up status from its jobs.
///
/// Called inside the transaction of every job status change, after locking
/// the build row for update. The build row is the single serialisation
/// point: under read-committed isolation with row locks the last concurrent
/// writer blocks on the lock, re-reads, and sees every sibling commit, so
/// its roll-up is the correct one. This engine serialises write
/// transactions process-wide, which subsumes that argument; engines running
/// snapshot isolation instead need a second transaction and a retry loop
/// here.
///
/// | observation                    | build status |
/// |--------------------------------|--------------|
/// | any job not queued, not all done | running    |
/// | all done, no failures          | succeeded    |
/// | all done, some failed/canceled | failed       |
pub(crate) fn maintain_build_status(
    db: &mut Database,
    build_id: derrick_core::BuildId,
    now_ms: u64,
) -> Result<()> {
    let mut build = db.read_build_for_update(build_id)?;
    if build.status.is_finished() {
        return Ok(());
    }

    let jobs = db.jobs_for_build(build_id);
    let all_done = jobs.iter().all(|j| j.status.is_finished());
    let n_failed = jobs.iter().filter(|j| j.status.has_failed()).count();
    let any_started = jobs.iter().any(|j| j.status != Status::Queued);

    let new_status = if all_done {
        if n_failed == 0 {
            Some(Status::Succeeded)
        } else {
            Some(Status::Failed)
        }
    } else if any_started {
        Some(Status::Running)
    } else {
        None
    };

    let Some(new_status) = new_status else { return Ok(()) };
    if new_status == build.status {
        return Ok(());
    }

    build.status = new_status;
    build.timings.stamp(new_status, now_ms);
    if new_status == Status::Failed {
        build.error = Some(format!("{n_failed} job(s) failed"));
    }
    if new_status.is_finished() {
        db.seal_log(build.log_descriptor_id);
        // The transient per-build identity minted for dequeue tokens dies
        // with the build.
        if let Some(identity) = db.identity_for_owner(build.id.into()) {
            db.delete_identity(identity.id)?;
        }
    }
    db.put_build(build.clone());
    tracing::info!(build = %build.id, status = %new_status, "build status changed");

    db.publish_event(
        Event::new(
            build.id,
            EventKind::BuildStatusChanged,
            build.id,
            format!("build #{}", build.build_number),
            new_status.to_string(),
        ),
        now_ms,
    );
    scm::enqueue_notification(db, &build, now_ms)?;
    Ok(())
}

/// Emit the status-changed event for a job.
pub(crate) fn publish_job_event(db: &mut Database, job: &Job, now_ms: u64) {
    db.publish_event(
        Event::new(
            job.build_id,
            EventKind::JobStatusChanged,
            job.id,
            job.name.clone(),
            job.status.to_string(),
        )
        .with_job(job.workflow.clone(), job.name.clone()),
        now_ms,
    );
}

/// Emit the status-changed event for a step.
pub(crate) fn publish_step_event(db: &mut Database, job: &Job, step: &Step, now_ms: u64) {
    db.publish_event(
        Event::new(
            step.build_id,
            EventKind::StepStatusChanged,
            step.id,
            step.name.clone(),
            step.status.to_string(),
        )
        .with_job(job.workflow.clone(), job.name.clone()),
        now_ms,
    );
}

/// Move a job to `status` inside an open transaction, maintaining the
/// build roll-up. Shared by the public update path, dequeue and the reaper.
pub(crate) fn transition_job(
    db: &mut Database,
    mut job: Job,
    status: Status,
    error: Option<String>,
    expected: &Etag,
    now_ms: u64,
) -> Result<Job> {
    if job.status == status {
        return Ok(job);
    }
    if !job.status.can_transition_to(status) {
        return Err(Error::validation(format!(
            "job '{}' cannot move from {} to {}",
            job.qualified_name(),
            job.status,
            status
        )));
    }
    job.status = status;
    if error.is_some() {
        job.error = error;
    }
    job.timings.stamp(status, now_ms);
    if status.is_finished() {
        db.seal_log(job.log_descriptor_id);
    }
    let job = db.update_job(job, expected)?;
    publish_job_event(db, &job, now_ms);
    maintain_build_status(db, job.build_id, now_ms)?;
    Ok(job)
}

impl<C: Clock> Engine<C> {
    /// Report a job's new status.
    ///
    /// Verifies the caller's etag (sentinel `"*"` bypasses), stamps the
    /// matching timing field, seals the log on terminal statuses, emits
    /// `JobStatusChanged` on change, and recomputes the build roll-up.
    ///
    /// Produces `NotFound`, `OptimisticLockFailed` and `ValidationFailed`
    /// (status regression).
    pub fn update_job_status(
        &self,
        job_id: JobId,
        status: Status,
        error: Option<String>,
        expected: &Etag,
    ) -> Result<Job> {
        let now = self.clock().epoch_ms();
        self.store().write(|db| {
            let job = db.read_job_for_update(job_id)?;
            transition_job(db, job, status, error.clone(), expected, now)
        })
    }

    /// Report a step's new status. Same etag and timing semantics as jobs;
    /// steps do not feed the build roll-up directly.
    pub fn update_step_status(
        &self,
        step_id: StepId,
        status: Status,
        error: Option<String>,
        expected: &Etag,
    ) -> Result<Step> {
        let now = self.clock().epoch_ms();
        self.store().write(|db| {
            let mut step = db.read_step(step_id)?;
            if step.status == status {
                return Ok(step);
            }
            if !step.status.can_transition_to(status) {
                return Err(Error::validation(format!(
                    "step '{}' cannot move from {} to {}",
                    step.name, step.status, status
                )));
            }
            step.status = status;
            if error.is_some() {
                step.error = error.clone();
            }
            step.timings.stamp(status, now);
            if status.is_finished() {
                db.seal_log(step.log_descriptor_id);
            }
            let job = db.read_job(step.job_id)?;
            let step = db.update_step(step, expected)?;
            publish_step_event(db, &job, &step, now);
            Ok(step)
        })
    }

    /// Record the fingerprint a runner computed for a job.
    ///
    /// Unless the build was forced, an earlier successful job with the same
    /// `(repo, workflow, name, fingerprint, hash type)` becomes the job's
    /// indirection target. The fingerprint is stored either way; the runner
    /// follows up with a status report, which is where any status change
    /// happens.
    pub fn record_fingerprint(
        &self,
        job_id: JobId,
        fingerprint: &str,
        hash_type: &str,
        expected: &Etag,
    ) -> Result<Job> {
        let now = self.clock().epoch_ms();
        self.store().write(|db| {
            let mut job = db.read_job_for_update(job_id)?;
            let build = db.read_build(job.build_id)?;
            if !build.options.force {
                if let Some(canonical) = db.canonical_job_for_fingerprint(
                    job.repo_id,
                    &job.workflow,
                    &job.name,
                    fingerprint,
                    hash_type,
                    job.id,
                ) {
                    tracing::debug!(
                        job = %job.id,
                        canonical = %canonical.id,
                        "job indirected to earlier equivalent"
                    );
                    job.indirect_to_job_id = Some(canonical.id);
                }
            }
            job.fingerprint = Some(fingerprint.to_string());
            job.fingerprint_hash_type = Some(hash_type.to_string());
            db.update_job(job, expected)
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
