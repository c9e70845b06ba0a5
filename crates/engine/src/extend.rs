// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic build extension: add jobs to a build already in flight.

use crate::enqueue::enqueue_jobs;
use crate::status::maintain_build_status;
use crate::Engine;
use derrick_core::{BuildGraph, BuildId, Clock, Error, JobGraph, Result};

impl<C: Clock> Engine<C> {
    /// Append the jobs of a definition document to an existing build.
    ///
    /// The merged graph is re-validated as a whole, which is where deferred
    /// cross-workflow dependencies finally resolve. Only jobs not already
    /// present are created; they get the same runner-capability pre-check
    /// as first-time enqueue, and the build roll-up is recomputed.
    ///
    /// Returns the whole graph plus the newly added job graphs. Unlike
    /// first-time enqueue, parse and validation failures surface to the
    /// caller as `ValidationFailed`; the build is left untouched.
    pub fn add_config_to_build(
        &self,
        build_id: BuildId,
        definition: &[u8],
        format: &str,
    ) -> Result<(BuildGraph, Vec<JobGraph>)> {
        let now = self.clock().epoch_ms();
        let parsed = self.parsers().parse(format, definition, &self.config().limits)?;

        self.store().write(|db| {
            let build = db.read_build_for_update(build_id)?;
            if build.status.is_finished() {
                return Err(Error::validation(format!(
                    "build #{} already finished",
                    build.build_number
                )));
            }
            let repo = db.read_repo(build.repo_id)?;

            let mut graph = BuildGraph::new(build.clone());
            for job in db.jobs_for_build(build_id) {
                let steps = db.steps_for_job(job.id);
                graph.push_job(JobGraph::new(job, steps));
            }

            // Re-submitted jobs are skipped, not duplicates.
            let appended = parsed.into_graph(build)?;
            for jg in appended.jobs {
                if graph.find_job(&jg.job.workflow, &jg.job.name).is_none() {
                    graph.push_job(jg);
                }
            }

            graph.populate_defaults(now);
            graph.validate(&self.config().limits)?;

            let added = enqueue_jobs(db, &mut graph, repo.legal_entity_id, now)?;
            maintain_build_status(db, build_id, now)?;
            graph.build = db.read_build(build_id)?;

            tracing::info!(build = %build_id, added = added.len(), "build extended");
            Ok((graph, added))
        })
    }
}

#[cfg(test)]
#[path = "extend_tests.rs"]
mod tests;
