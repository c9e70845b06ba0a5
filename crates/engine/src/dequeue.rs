// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner dispatch: hand the oldest ready job to a polling runner.

use crate::status::{maintain_build_status, publish_job_event, publish_step_event};
use crate::token;
use crate::Engine;
use derrick_core::{
    Artifact, Clock, Commit, Error, Etag, Job, LogDescriptorId, Repo, Result, RunnerId, Status,
    Step,
};
use derrick_store::Database;

/// Everything a runner needs to execute a job it was handed.
#[derive(Debug, Clone)]
pub struct RunnableJob {
    pub job: Job,
    pub steps: Vec<Step>,
    pub repo: Repo,
    pub commit: Commit,
    /// The jobs this job transitively depends on, for artifact resolution.
    pub dependency_jobs: Vec<Job>,
    /// Sealed artifacts of the groups this job's dependencies name, ready
    /// to download before the first step runs.
    pub dependency_artifacts: Vec<Artifact>,
    /// Short-lived token bound to the build's transient identity; the
    /// runner presents it on job-scoped calls.
    pub jwt: String,
    /// Deduplicated workflow components of the build's `nodes_to_run`.
    pub workflows_to_run: Vec<String>,
    pub log_descriptor_id: LogDescriptorId,
}

/// Resolve the artifact groups named by the job's direct dependencies
/// against the dependency jobs' sealed artifacts.
fn resolve_dependency_artifacts(
    db: &Database,
    job: &Job,
    dependency_jobs: &[Job],
) -> Vec<Artifact> {
    let mut artifacts: Vec<Artifact> = Vec::new();
    for dep in &job.depends {
        if dep.artifact_dependencies.is_empty() {
            continue;
        }
        for target in dependency_jobs.iter().filter(|d| dep.matches(&d.workflow, &d.name)) {
            for group in &dep.artifact_dependencies {
                for artifact in db.artifacts_for_job_group(target.id, group) {
                    if !artifacts.iter().any(|a| a.id == artifact.id) {
                        artifacts.push(artifact);
                    }
                }
            }
        }
    }
    artifacts
}

impl<C: Clock> Engine<C> {
    /// Dequeue the next runnable job for a runner.
    ///
    /// A job is runnable when it is queued, every dependency resolved to
    /// finished-successful jobs, and the runner's labels and supported
    /// types cover it. Candidates are taken oldest-queued first, ties by id
    /// descending.
    ///
    /// Produces `NotFound` (unknown runner or nothing runnable) and
    /// `RunnerDisabled`.
    pub fn dequeue(&self, runner_id: RunnerId) -> Result<RunnableJob> {
        let now = self.clock().epoch_ms();
        let ttl_ms = self.config().dequeue_token_ttl.as_millis() as u64;
        let secret = self.token_secret().to_vec();

        self.store().write(|db| {
            let runner = db.read_runner(runner_id)?;
            if !runner.enabled {
                return Err(Error::RunnerDisabled(format!("runner '{}'", runner.name)));
            }

            let job = db
                .dequeue_candidate(&runner)
                .ok_or_else(|| Error::not_found("no runnable jobs"))?;

            let build = db.read_build(job.build_id)?;
            let repo = db.read_repo(job.repo_id)?;
            let commit = db.read_commit(job.commit_id)?;
            let dependency_jobs = db.dependency_jobs(&job);
            let dependency_artifacts = resolve_dependency_artifacts(db, &job, &dependency_jobs);

            let (identity, _) = db.find_or_create_identity(
                build.id,
                &format!("build-{}", build.build_number),
                now,
            )?;
            let jwt = token::mint(&secret, identity.id, now + ttl_ms);

            let mut job = job;
            job.status = Status::Submitted;
            job.timings.stamp(Status::Submitted, now);
            job.runner_id = Some(runner.id);
            let job = db.update_job(job, &Etag::wildcard())?;
            publish_job_event(db, &job, now);

            let mut steps = db.steps_for_job(job.id);
            for step in &mut steps {
                step.status = Status::Submitted;
                step.timings.stamp(Status::Submitted, now);
                let updated = db.update_step(step.clone(), &Etag::wildcard())?;
                publish_step_event(db, &job, &updated, now);
                *step = updated;
            }

            maintain_build_status(db, build.id, now)?;
            tracing::info!(job = %job.id, runner = %runner.id, "job dispatched");

            Ok(RunnableJob {
                log_descriptor_id: job.log_descriptor_id,
                workflows_to_run: build.options.workflows_to_run(),
                job,
                steps,
                repo,
                commit,
                dependency_jobs,
                dependency_artifacts,
                jwt,
            })
        })
    }
}

#[cfg(test)]
#[path = "dequeue_tests.rs"]
mod tests;
