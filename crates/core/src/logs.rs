// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log descriptors and artifact metadata.
//!
//! Blob contents live in external stores; the core tracks only the metadata
//! rows and their sealing.

use crate::etag::Etag;
use crate::id::{ResourceId, ResourceKind};
use crate::job::JobId;
use crate::resource::MutableResource;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a log descriptor.
    pub struct LogDescriptorId(ResourceKind::LogDescriptor);
}

crate::define_id! {
    /// Unique identifier for an artifact.
    pub struct ArtifactId(ResourceKind::Artifact);
}

/// Metadata for one hierarchical log (build → job → step parent chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDescriptor {
    pub id: LogDescriptorId,
    /// The build, job or step this log belongs to.
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_log_id: Option<LogDescriptorId>,
    /// Set when the owning resource reached a terminal status; a sealed log
    /// accepts no further writes.
    #[serde(default)]
    pub sealed: bool,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { LogDescriptor, LogDescriptorId, ResourceKind::LogDescriptor }

impl LogDescriptor {
    pub fn new(resource_id: impl Into<ResourceId>, parent_log_id: Option<LogDescriptorId>) -> Self {
        Self {
            id: LogDescriptorId::new(),
            resource_id: resource_id.into(),
            parent_log_id,
            sealed: false,
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }
}

/// Metadata for one artifact produced by a job.
///
/// `sealed` flips once the upload completed and the hash/size are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub job_id: JobId,
    pub group_name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sealed: bool,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Artifact, ArtifactId, ResourceKind::Artifact }

impl Artifact {
    pub fn new(job_id: JobId, group_name: impl Into<String>, path: impl Into<String>) -> Self {
        let mut artifact = Self {
            id: ArtifactId::new(),
            job_id,
            group_name: group_name.into(),
            path: path.into(),
            hash: None,
            size: 0,
            sealed: false,
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        artifact.etag = artifact.content_etag();
        artifact
    }
}

impl MutableResource for Artifact {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(
            &self.job_id,
            &self.group_name,
            &self.path,
            &self.hash,
            self.size,
            self.sealed,
        ))
    }
}
