// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over log descriptors and artifact metadata.

use crate::db::Database;
use derrick_core::{
    Artifact, JobId, LogDescriptor, LogDescriptorId, MutableResource, ResourceId, Result,
};

impl Database {
    /// Create a log descriptor for a resource, chained under its parent
    /// log.
    pub fn create_log_descriptor(
        &mut self,
        resource_id: impl Into<ResourceId>,
        parent_log_id: Option<LogDescriptorId>,
        now_ms: u64,
    ) -> Result<LogDescriptor> {
        self.log_descriptors.create(LogDescriptor::new(resource_id, parent_log_id), now_ms)
    }

    pub fn read_log_descriptor(&self, id: LogDescriptorId) -> Result<LogDescriptor> {
        self.log_descriptors.read(id)
    }

    /// Mark a log immutable. Idempotent; sealing a missing log is a no-op
    /// so terminal transitions never fail on log bookkeeping.
    pub fn seal_log(&mut self, id: LogDescriptorId) {
        if let Ok(mut log) = self.log_descriptors.read(id) {
            if !log.sealed {
                log.sealed = true;
                self.log_descriptors.put_immutable(log);
            }
        }
    }

    pub fn insert_artifact(&mut self, mut artifact: Artifact, now_ms: u64) -> Result<Artifact> {
        artifact.refresh_etag();
        let artifact = self.artifacts.create(artifact, now_ms)?;
        self.create_ownership(artifact.job_id, artifact.id, now_ms)?;
        Ok(artifact)
    }

    /// Sealed artifacts of one group of one job, the shape consumed when
    /// assembling a runnable job's artifact dependencies. Unsealed rows are
    /// still mid-upload and excluded.
    pub fn artifacts_for_job_group(&self, job_id: JobId, group_name: &str) -> Vec<Artifact> {
        let mut artifacts: Vec<Artifact> = self
            .artifacts
            .iter_live()
            .filter(|a| a.job_id == job_id && a.group_name == group_name && a.sealed)
            .cloned()
            .collect();
        artifacts.sort_by(|a, b| (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id)));
        artifacts
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
