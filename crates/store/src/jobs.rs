// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over jobs and steps, including the dequeue candidate search and
//! the fingerprint indirection lookup.

use crate::db::Database;
use derrick_core::{
    Build, BuildId, Etag, Job, JobId, MutableResource, RepoId, Result, Runner, Status, Step,
    StepId,
};

impl Database {
    pub fn insert_job(&mut self, mut job: Job, now_ms: u64) -> Result<Job> {
        job.refresh_etag();
        let job = self.jobs.create(job, now_ms)?;
        self.create_ownership(job.build_id, job.id, now_ms)?;
        Ok(job)
    }

    pub fn read_job(&self, id: JobId) -> Result<Job> {
        self.jobs.read(id)
    }

    /// Read a job with the intent to update it. Exclusive by construction
    /// under the process-wide write lock.
    pub fn read_job_for_update(&mut self, id: JobId) -> Result<Job> {
        self.jobs.read(id)
    }

    /// Unconditional write of a job already read inside this transaction.
    pub fn put_job(&mut self, job: Job) {
        self.jobs.put(job);
    }

    /// Compare-and-swap update of a job. Produces `OptimisticLockFailed`.
    pub fn update_job(&mut self, job: Job, expected: &Etag) -> Result<Job> {
        self.jobs.update(job, expected)
    }

    /// Jobs of a build, oldest first (stable roll-up and display order).
    pub fn jobs_for_build(&self, build_id: BuildId) -> Vec<Job> {
        let mut jobs: Vec<Job> =
            self.jobs.iter_live().filter(|j| j.build_id == build_id).cloned().collect();
        jobs.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        jobs
    }

    /// A job of a build addressed by `(workflow, name)`.
    pub fn find_job_by_name(&self, build_id: BuildId, workflow: &str, name: &str) -> Option<Job> {
        self.jobs
            .iter_live()
            .find(|j| j.build_id == build_id && j.workflow == workflow && j.name == name)
            .cloned()
    }

    pub fn insert_step(&mut self, mut step: Step, now_ms: u64) -> Result<Step> {
        step.refresh_etag();
        let step = self.steps.create(step, now_ms)?;
        self.create_ownership(step.job_id, step.id, now_ms)?;
        Ok(step)
    }

    pub fn read_step(&self, id: StepId) -> Result<Step> {
        self.steps.read(id)
    }

    pub fn put_step(&mut self, step: Step) {
        self.steps.put(step);
    }

    pub fn update_step(&mut self, step: Step, expected: &Etag) -> Result<Step> {
        self.steps.update(step, expected)
    }

    /// Steps of a job, oldest first.
    pub fn steps_for_job(&self, job_id: JobId) -> Vec<Step> {
        let mut steps: Vec<Step> =
            self.steps.iter_live().filter(|s| s.job_id == job_id).cloned().collect();
        steps.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        steps
    }

    /// Whether every dependency of `job` is satisfied: each dependency must
    /// resolve to at least one sibling job, and every resolved job must have
    /// finished successfully. A dependency resolving to nothing is never
    /// satisfied, wildcard or not: either its workflow is absent and dynamic
    /// extension has yet to supply it, or the reference dangles (validation
    /// rejects that shape, but rows written around the graph layer get the
    /// same answer).
    pub fn job_dependencies_satisfied(&self, job: &Job) -> bool {
        let siblings = self.jobs_for_build(job.build_id);
        job.depends.iter().all(|dep| {
            let matched: Vec<&Job> = siblings
                .iter()
                .filter(|s| dep.matches(&s.workflow, &s.name) && s.id != job.id)
                .collect();
            !matched.is_empty() && matched.iter().all(|s| s.status == Status::Succeeded)
        })
    }

    /// The job this runner should take next: queued, dependencies satisfied,
    /// type and labels compatible. Oldest-queued first; ties on the same
    /// timestamp break by id descending.
    pub fn dequeue_candidate(&self, runner: &Runner) -> Option<Job> {
        let owned_repo_ids: Vec<RepoId> = self
            .repos
            .iter_live()
            .filter(|r| r.legal_entity_id == runner.legal_entity_id)
            .map(|r| r.id)
            .collect();

        let mut candidates: Vec<&Job> = self
            .jobs
            .iter_live()
            .filter(|j| j.status == Status::Queued)
            .filter(|j| owned_repo_ids.contains(&j.repo_id))
            .filter(|j| runner.can_run(j))
            .collect();
        candidates.sort_by(|a, b| {
            let ka = (a.timings.queued_at_ms.unwrap_or(a.created_at_ms), std::cmp::Reverse(a.id));
            let kb = (b.timings.queued_at_ms.unwrap_or(b.created_at_ms), std::cmp::Reverse(b.id));
            ka.cmp(&kb)
        });

        candidates
            .into_iter()
            .find(|j| self.job_dependencies_satisfied(j))
            .cloned()
    }

    /// The canonical earlier job carrying this fingerprint, for indirection.
    ///
    /// When two jobs with identical fingerprints finish concurrently both
    /// converge on the same canonical job: matches order by
    /// `(created_at ASC, id ASC)` and the first successful one wins.
    pub fn canonical_job_for_fingerprint(
        &self,
        repo_id: RepoId,
        workflow: &str,
        job_name: &str,
        fingerprint: &str,
        hash_type: &str,
        exclude: JobId,
    ) -> Option<Job> {
        let mut matches: Vec<&Job> = self
            .jobs
            .iter_live()
            .filter(|j| {
                j.id != exclude
                    && j.repo_id == repo_id
                    && j.workflow == workflow
                    && j.name == job_name
                    && j.status == Status::Succeeded
                    && j.fingerprint.as_deref() == Some(fingerprint)
                    && j.fingerprint_hash_type.as_deref() == Some(hash_type)
            })
            .collect();
        matches.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        matches.first().cloned().cloned()
    }

    /// Jobs currently in `status`, oldest first. The reaper pages over the
    /// non-finished statuses with this.
    pub fn jobs_with_status(&self, status: Status) -> Vec<Job> {
        let mut jobs: Vec<Job> =
            self.jobs.iter_live().filter(|j| j.status == status).cloned().collect();
        jobs.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        jobs
    }

    /// Jobs of a build a runnable job depends on, transitively, for handing
    /// to the runner alongside the job itself.
    pub fn dependency_jobs(&self, job: &Job) -> Vec<Job> {
        let siblings = self.jobs_for_build(job.build_id);
        let mut out: Vec<Job> = Vec::new();
        let mut frontier = vec![job.clone()];
        while let Some(current) = frontier.pop() {
            for dep in &current.depends {
                for sibling in &siblings {
                    if dep.matches(&sibling.workflow, &sibling.name)
                        && sibling.id != current.id
                        && !out.iter().any(|j: &Job| j.id == sibling.id)
                    {
                        out.push(sibling.clone());
                        frontier.push(sibling.clone());
                    }
                }
            }
        }
        out.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        out
    }

    /// The build a job belongs to.
    pub fn build_of_job(&self, job: &Job) -> Result<Build> {
        self.read_build(job.build_id)
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
