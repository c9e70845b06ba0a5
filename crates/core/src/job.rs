// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs: the schedulable units of a build, executed entirely on one runner.

use crate::build::BuildId;
use crate::etag::Etag;
use crate::id::ResourceKind;
use crate::resource::MutableResource;
use crate::logs::LogDescriptorId;
use crate::repo::{CommitId, RepoId};
use crate::runner::RunnerId;
use crate::status::{Status, WorkflowTimings};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

crate::define_id! {
    /// Unique identifier for a job.
    pub struct JobId(ResourceKind::Job);
}

/// Execution environment a job requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Runs inside a container image.
    Docker,
    /// Runs directly on the runner host.
    Exec,
    /// Forward-compatible escape hatch for runner-defined types.
    Other(String),
}

impl JobType {
    pub fn parse(s: &str) -> JobType {
        match s {
            "docker" => JobType::Docker,
            "exec" => JobType::Exec,
            other => JobType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobType::Docker => "docker",
            JobType::Exec => "exec",
            JobType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a job's steps are ordered at execution time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepExecution {
    #[default]
    Sequential,
    Parallel,
}

crate::simple_display! {
    StepExecution {
        Sequential => "sequential",
        Parallel => "parallel",
    }
}

/// Dependency of one job on another, optionally pulling artifact groups.
///
/// `job_name` may be the wildcard `"*"`, matching every job of the target
/// workflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobDependency {
    /// Target workflow; the empty string is the default workflow.
    #[serde(default)]
    pub workflow: String,
    pub job_name: String,
    /// Artifact groups of the target job the depending job consumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_dependencies: Vec<String>,
}

impl JobDependency {
    pub const WILDCARD: &'static str = "*";

    pub fn new(workflow: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            job_name: job_name.into(),
            artifact_dependencies: Vec::new(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.job_name == Self::WILDCARD
    }

    /// Whether this dependency targets the given job.
    pub fn matches(&self, workflow: &str, job_name: &str) -> bool {
        self.workflow == workflow && (self.is_wildcard() || self.job_name == job_name)
    }
}

impl std::fmt::Display for JobDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.workflow.is_empty() {
            f.write_str(&self.job_name)
        } else {
            write!(f, "{}.{}", self.workflow, self.job_name)
        }
    }
}

/// A sidecar service started alongside a job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// A named group of output paths a job publishes as artifacts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactDefinition {
    pub group_name: String,
    pub paths: Vec<String>,
}

/// One schedulable unit within a build.
///
/// `name` is unique within `(build, workflow)`; the empty workflow name is
/// the default workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub build_id: BuildId,
    pub repo_id: RepoId,
    pub commit_id: CommitId,
    #[serde(default)]
    pub workflow: String,
    pub name: String,
    pub job_type: JobType,
    /// Image for docker jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    /// Labels a runner must carry to take this job.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub runs_on: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<JobDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_definitions: Vec<ArtifactDefinition>,
    /// Commands whose output is hashed into the job's fingerprint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fingerprint_commands: Vec<String>,
    #[serde(default)]
    pub step_execution: StepExecution,
    pub status: Status,
    pub timings: WorkflowTimings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable hash of the job's definition, including its steps.
    #[serde(default)]
    pub definition_data_hash: String,
    /// Content fingerprint reported by the runner after it evaluated the
    /// fingerprint commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_hash_type: Option<String>,
    /// Set when an earlier job with the same fingerprint stands in for this
    /// one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_to_job_id: Option<JobId>,
    /// Runner the job was dispatched to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_id: Option<RunnerId>,
    pub log_descriptor_id: LogDescriptorId,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Job, JobId, ResourceKind::Job }

impl Job {
    pub fn new(workflow: impl Into<String>, name: impl Into<String>, job_type: JobType) -> Self {
        Self {
            id: JobId::empty(),
            build_id: BuildId::empty(),
            repo_id: RepoId::empty(),
            commit_id: CommitId::empty(),
            workflow: workflow.into(),
            name: name.into(),
            job_type,
            docker_image: None,
            runs_on: BTreeSet::new(),
            depends: Vec::new(),
            services: Vec::new(),
            environment: BTreeMap::new(),
            artifact_definitions: Vec::new(),
            fingerprint_commands: Vec::new(),
            step_execution: StepExecution::Sequential,
            status: Status::Queued,
            timings: WorkflowTimings::default(),
            error: None,
            definition_data_hash: String::new(),
            fingerprint: None,
            fingerprint_hash_type: None,
            indirect_to_job_id: None,
            runner_id: None,
            log_descriptor_id: LogDescriptorId::empty(),
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    /// `workflow.name`, or just `name` for the default workflow.
    pub fn qualified_name(&self) -> String {
        if self.workflow.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.workflow, self.name)
        }
    }
}

impl MutableResource for Job {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(
            &self.build_id,
            &self.workflow,
            &self.name,
            self.status,
            &self.timings,
            &self.error,
            &self.fingerprint,
            &self.fingerprint_hash_type,
            &self.indirect_to_job_id,
            &self.runner_id,
        ))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
