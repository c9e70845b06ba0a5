// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-facing message bodies.

use derrick_core::{Artifact, Commit, Error, Job, LogDescriptorId, Repo, Result, Status, Step};
use serde::{Deserialize, Serialize};

/// Body of a successful dequeue: everything a runner needs to execute the
/// job it was handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnableJobResponse {
    pub job: Job,
    pub steps: Vec<Step>,
    pub repo: Repo,
    pub commit: Commit,
    #[serde(default)]
    pub dependency_jobs: Vec<Job>,
    /// Sealed artifacts of the groups the job's dependencies name.
    #[serde(default)]
    pub dependency_artifacts: Vec<Artifact>,
    /// Token the runner presents on job-scoped calls.
    pub jwt: String,
    #[serde(default)]
    pub workflows_to_run: Vec<String>,
    pub log_descriptor_id: LogDescriptorId,
}

/// One validated `PATCH` form for a job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPatch {
    /// Status report. The etag is mandatory here.
    Status {
        status: Status,
        error: Option<String>,
        etag: String,
    },
    /// Fingerprint report. The etag is optional.
    Fingerprint {
        fingerprint: String,
        fingerprint_hash_type: String,
        etag: Option<String>,
    },
}

/// Raw `PATCH` body for a job. The status and fingerprint forms are
/// mutually exclusive; [`JobPatchBody::classify`] enforces that and the
/// per-form etag rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatchBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_hash_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl JobPatchBody {
    /// Decide which form this body is. Produces `ValidationFailed` for
    /// bodies mixing the forms, naming neither, or violating the etag
    /// rule.
    pub fn classify(self) -> Result<JobPatch> {
        let has_status = self.status.is_some() || self.error.is_some();
        let has_fingerprint = self.fingerprint.is_some() || self.fingerprint_hash_type.is_some();
        match (has_status, has_fingerprint) {
            (true, true) => {
                Err(Error::validation("status and fingerprint forms are mutually exclusive"))
            }
            (false, false) => Err(Error::validation("patch names neither status nor fingerprint")),
            (true, false) => {
                let status = self
                    .status
                    .ok_or_else(|| Error::validation("status form requires a status"))?;
                let etag = self
                    .etag
                    .ok_or_else(|| Error::validation("status form requires an etag"))?;
                Ok(JobPatch::Status { status, error: self.error, etag })
            }
            (false, true) => {
                let fingerprint = self
                    .fingerprint
                    .ok_or_else(|| Error::validation("fingerprint form requires a fingerprint"))?;
                let fingerprint_hash_type = self.fingerprint_hash_type.ok_or_else(|| {
                    Error::validation("fingerprint form requires a fingerprint_hash_type")
                })?;
                Ok(JobPatch::Fingerprint {
                    fingerprint,
                    fingerprint_hash_type,
                    etag: self.etag,
                })
            }
        }
    }
}

/// `PATCH` body for a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPatch {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub etag: String,
}

/// Body of a dynamic-extension post: another definition document for an
/// in-flight build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendBuildRequest {
    /// Content tag selecting the parser.
    pub format: String,
    /// The definition document itself.
    pub definition: String,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
