// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds: one run of a build definition against a specific commit.

use crate::etag::Etag;
use crate::id::ResourceKind;
use crate::logs::LogDescriptorId;
use crate::repo::{CommitId, RepoId};
use crate::resource::MutableResource;
use crate::status::{Status, WorkflowTimings};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a build.
    pub struct BuildId(ResourceKind::Build);
}

/// Reference to a node of the build graph: a workflow, or one job within a
/// workflow.
///
/// The string form is `workflow.job`; a bare segment names a whole workflow
/// and a leading dot names a job in the default (empty-named) workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub workflow: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl NodeRef {
    pub fn workflow(workflow: impl Into<String>) -> Self {
        Self { workflow: workflow.into(), job: None }
    }

    pub fn job(workflow: impl Into<String>, job: impl Into<String>) -> Self {
        Self { workflow: workflow.into(), job: Some(job.into()) }
    }

    /// Whether this reference names a specific job rather than a workflow.
    pub fn is_job(&self) -> bool {
        self.job.is_some()
    }

    pub fn parse(s: &str) -> Self {
        match s.split_once('.') {
            Some((workflow, job)) => Self::job(workflow, job),
            None => Self::workflow(s),
        }
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.job {
            Some(job) => write!(f, "{}.{}", self.workflow, job),
            None => f.write_str(&self.workflow),
        }
    }
}

/// Caller-supplied options for a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Run every job even when an earlier job with the same fingerprint
    /// could stand in for it.
    #[serde(default)]
    pub force: bool,
    /// Restrict the build to these nodes plus their transitive dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes_to_run: Vec<NodeRef>,
}

impl BuildOptions {
    /// Whether every requested node names a job, which is the precondition
    /// for trimming the graph.
    pub fn all_nodes_are_jobs(&self) -> bool {
        !self.nodes_to_run.is_empty() && self.nodes_to_run.iter().all(NodeRef::is_job)
    }

    /// The deduplicated workflow components of the requested nodes.
    pub fn workflows_to_run(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        self.nodes_to_run
            .iter()
            .filter(|n| seen.insert(n.workflow.clone()))
            .map(|n| n.workflow.clone())
            .collect()
    }
}

/// One run of a build definition against a specific commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub repo_id: RepoId,
    pub commit_id: CommitId,
    /// Ref the build was submitted for ("refs/heads/main", ...).
    pub ref_name: String,
    /// Monotone per-repo sequence number, assigned at insert.
    pub build_number: u64,
    pub status: Status,
    pub timings: WorkflowTimings,
    pub options: BuildOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub log_descriptor_id: LogDescriptorId,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Build, BuildId, ResourceKind::Build }

impl Build {
    pub fn new(repo_id: RepoId, commit_id: CommitId, ref_name: impl Into<String>) -> Self {
        let mut build = Self {
            id: BuildId::new(),
            repo_id,
            commit_id,
            ref_name: ref_name.into(),
            build_number: 0,
            status: Status::Queued,
            timings: WorkflowTimings::default(),
            options: BuildOptions::default(),
            error: None,
            log_descriptor_id: LogDescriptorId::empty(),
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        build.etag = build.content_etag();
        build
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self.etag = self.content_etag();
        self
    }
}

impl MutableResource for Build {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(
            &self.repo_id,
            &self.commit_id,
            &self.ref_name,
            self.build_number,
            self.status,
            &self.timings,
            &self.options,
            &self.error,
        ))
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
