// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build enqueue: parse → graph → validate → persist → initial roll-up.

use crate::status::{maintain_build_status, publish_job_event};
use crate::Engine;
use derrick_core::{
    Build, BuildGraph, BuildOptions, Clock, CommitId, Event, EventKind, JobGraph, RepoId, Result,
    Status,
};
use derrick_store::Database;

/// Everything needed to enqueue a build from an explicit definition.
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    pub repo_id: RepoId,
    pub commit_id: CommitId,
    pub ref_name: String,
    /// Content tag selecting the parser.
    pub format: String,
    pub definition: Vec<u8>,
    pub options: BuildOptions,
}

pub(crate) const NO_CAPABLE_RUNNER: &str = "no runners are capable of running this job";

impl<C: Clock> Engine<C> {
    /// Enqueue a build for a commit, using the definition stored on the
    /// commit itself.
    pub fn enqueue_commit(&self, commit_id: CommitId, options: BuildOptions) -> Result<BuildGraph> {
        let commit = self.read_commit(commit_id)?;
        self.enqueue_build(EnqueueRequest {
            repo_id: commit.repo_id,
            commit_id: commit.id,
            ref_name: String::new(),
            format: commit.definition_format.clone(),
            definition: commit.definition,
            options,
        })
    }

    /// Enqueue a build.
    ///
    /// A definition that fails to parse or validate is not an error to the
    /// caller: the build is persisted as a failed skeleton carrying the
    /// error and returned. Only failures in the caller's own request
    /// surface as `ValidationFailed`, such as a `nodes_to_run` entry naming
    /// a job the definition does not contain. Jobs no registered runner
    /// could ever execute are placed directly into `failed`.
    pub fn enqueue_build(&self, request: EnqueueRequest) -> Result<BuildGraph> {
        let now = self.clock().epoch_ms();

        let build = Build::new(request.repo_id, request.commit_id, request.ref_name.clone())
            .with_options(request.options.clone());

        let graph = self
            .parsers()
            .parse(&request.format, &request.definition, &self.config().limits)
            .map_err(derrick_core::Error::from)
            .and_then(|definition| definition.into_graph(build.clone()).map_err(Into::into));

        let mut graph = match graph {
            Ok(graph) => graph,
            Err(parse_err) => return self.persist_failed_skeleton(build, &parse_err, now),
        };

        if graph.build.options.all_nodes_are_jobs() {
            let nodes = graph.build.options.nodes_to_run.clone();
            graph.trim(&nodes)?;
        }
        graph.populate_defaults(now);
        if let Err(validation_err) = graph.validate(&self.config().limits) {
            return self.persist_failed_skeleton(graph.build, &validation_err, now);
        }

        self.store().write(|db| {
            let repo = db.read_repo(graph.build.repo_id)?;
            db.read_commit(graph.build.commit_id)?;

            let build_log = db.create_log_descriptor(graph.build.id, None, now)?;
            graph.build.log_descriptor_id = build_log.id;
            graph.build = db.insert_build(graph.build.clone(), now)?;

            db.publish_event(
                Event::new(
                    graph.build.id,
                    EventKind::BuildStatusChanged,
                    graph.build.id,
                    format!("build #{}", graph.build.build_number),
                    graph.build.status.to_string(),
                ),
                now,
            );

            crate::scm::enqueue_notification(db, &graph.build, now)?;
            enqueue_jobs(db, &mut graph, repo.legal_entity_id, now)?;
            maintain_build_status(db, graph.build.id, now)?;
            graph.build = db.read_build(graph.build.id)?;
            Ok(graph.clone())
        })
    }

    /// Persist a failed skeleton build recording a definition error:
    /// timings all stamped, no jobs, the parse or validation error as the
    /// build error.
    fn persist_failed_skeleton(
        &self,
        mut build: Build,
        err: &derrick_core::Error,
        now_ms: u64,
    ) -> Result<BuildGraph> {
        tracing::info!(build = %build.id, error = %err, "definition rejected, persisting failed build");
        build.status = Status::Failed;
        build.error = Some(err.to_string());
        build.timings.stamp_all(now_ms);
        build.created_at_ms = now_ms;

        self.store().write(|db| {
            let log = db.create_log_descriptor(build.id, None, now_ms)?;
            let mut build = build.clone();
            build.log_descriptor_id = log.id;
            db.seal_log(log.id);
            let build = db.insert_build(build, now_ms)?;
            db.publish_event(
                Event::new(
                    build.id,
                    EventKind::BuildStatusChanged,
                    build.id,
                    format!("build #{}", build.build_number),
                    build.status.to_string(),
                ),
                now_ms,
            );
            crate::scm::enqueue_notification(db, &build, now_ms)?;
            Ok(BuildGraph::new(build))
        })
    }
}

/// Persist every job graph not yet present in the store: log descriptors,
/// job row, step rows, ownership chain, `JobStatusChanged` events.
/// Idempotent over `(workflow, name)` so dynamic extension reuses it.
///
/// Jobs whose label/type requirements no live enabled runner of the owning
/// entity satisfies are placed directly into `failed`, steps included,
/// before they are persisted.
///
/// Returns the job graphs actually inserted.
pub(crate) fn enqueue_jobs(
    db: &mut Database,
    graph: &mut BuildGraph,
    legal_entity_id: derrick_core::LegalEntityId,
    now_ms: u64,
) -> Result<Vec<JobGraph>> {
    let build_log_id = graph.build.log_descriptor_id;
    let mut inserted = Vec::new();

    for jg in &mut graph.jobs {
        if db.find_job_by_name(graph.build.id, &jg.job.workflow, &jg.job.name).is_some() {
            continue;
        }

        if !db.any_capable_runner(legal_entity_id, &jg.job) {
            tracing::warn!(job = %jg.job.qualified_name(), "{}", NO_CAPABLE_RUNNER);
            jg.job.status = Status::Failed;
            jg.job.error = Some(NO_CAPABLE_RUNNER.to_string());
            jg.job.timings.stamp(Status::Failed, now_ms);
            for step in &mut jg.steps {
                step.status = Status::Failed;
                step.error = Some(NO_CAPABLE_RUNNER.to_string());
                step.timings.stamp(Status::Failed, now_ms);
            }
        }

        let job_log = db.create_log_descriptor(jg.job.id, Some(build_log_id), now_ms)?;
        jg.job.log_descriptor_id = job_log.id;
        jg.job = db.insert_job(jg.job.clone(), now_ms)?;

        for step in &mut jg.steps {
            let step_log = db.create_log_descriptor(step.id, Some(job_log.id), now_ms)?;
            step.log_descriptor_id = step_log.id;
            *step = db.insert_step(step.clone(), now_ms)?;
        }

        publish_job_event(db, &jg.job, now_ms);
        inserted.push(jg.clone());
    }

    Ok(inserted)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
