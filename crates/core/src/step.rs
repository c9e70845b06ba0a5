// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Steps: command sequences within a job, ordered via intra-job dependencies.

use crate::build::BuildId;
use crate::etag::Etag;
use crate::id::ResourceKind;
use crate::resource::MutableResource;
use crate::job::JobId;
use crate::logs::LogDescriptorId;
use crate::status::{Status, WorkflowTimings};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a step.
    pub struct StepId(ResourceKind::Step);
}

/// Dependency of one step on another step of the same job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepDependency {
    pub step_name: String,
}

impl StepDependency {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self { step_name: step_name.into() }
    }
}

/// One command sequence within a job. `name` is unique within the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub job_id: JobId,
    pub build_id: BuildId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<StepDependency>,
    pub status: Status,
    pub timings: WorkflowTimings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub log_descriptor_id: LogDescriptorId,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Step, StepId, ResourceKind::Step }

impl Step {
    pub fn new(name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            id: StepId::empty(),
            job_id: JobId::empty(),
            build_id: BuildId::empty(),
            name: name.into(),
            commands,
            depends: Vec::new(),
            status: Status::Queued,
            timings: WorkflowTimings::default(),
            error: None,
            log_descriptor_id: LogDescriptorId::empty(),
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }
}

impl MutableResource for Step {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(&self.job_id, &self.name, self.status, &self.timings, &self.error))
    }
}
