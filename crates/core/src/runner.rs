// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner agents: external worker processes that poll for runnable jobs.

use crate::etag::Etag;
use crate::id::ResourceKind;
use crate::job::{Job, JobType};
use crate::principal::LegalEntityId;
use crate::resource::{MutableResource, Resource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

crate::define_id! {
    /// Unique identifier for a runner.
    pub struct RunnerId(ResourceKind::Runner);
}

/// A registered worker agent owned by a legal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub id: RunnerId,
    pub legal_entity_id: LegalEntityId,
    pub name: String,
    /// Operating system reported by the agent ("linux", ...).
    pub os: String,
    /// CPU architecture reported by the agent ("amd64", ...).
    pub arch: String,
    /// Labels jobs can target via `runs_on`. Always includes `os` and
    /// `arch`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub supported_job_types: BTreeSet<JobType>,
    pub enabled: bool,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Runner, RunnerId, ResourceKind::Runner }

impl Runner {
    pub fn new(
        legal_entity_id: LegalEntityId,
        name: impl Into<String>,
        os: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        let mut runner = Self {
            id: RunnerId::new(),
            legal_entity_id,
            name: name.into(),
            os: os.into(),
            arch: arch.into(),
            labels: BTreeSet::new(),
            supported_job_types: [JobType::Docker, JobType::Exec].into_iter().collect(),
            enabled: true,
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        runner.apply_default_labels();
        runner.etag = runner.content_etag();
        runner
    }

    /// Add the OS and architecture to the label set. Idempotent.
    pub fn apply_default_labels(&mut self) {
        if !self.os.is_empty() {
            self.labels.insert(self.os.clone());
        }
        if !self.arch.is_empty() {
            self.labels.insert(self.arch.clone());
        }
    }

    /// Whether this runner can execute the given job: it is enabled, speaks
    /// the job's type, and carries every label the job requires.
    pub fn can_run(&self, job: &Job) -> bool {
        self.enabled
            && !self.is_deleted()
            && self.supported_job_types.contains(&job.job_type)
            && job.runs_on.is_subset(&self.labels)
    }
}

impl MutableResource for Runner {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(
            &self.legal_entity_id,
            &self.name,
            &self.os,
            &self.arch,
            &self.labels,
            &self.supported_job_types,
            self.enabled,
        ))
    }
}

crate::builder! {
    pub struct RunnerBuilder => Runner {
        into {
            name: String = "test-runner",
            os: String = "linux",
            arch: String = "amd64",
        }
        set {
            legal_entity_id: LegalEntityId = LegalEntityId::empty(),
            labels: BTreeSet<String> =
                ["linux", "amd64"].into_iter().map(String::from).collect(),
            supported_job_types: BTreeSet<JobType> =
                [JobType::Docker, JobType::Exec].into_iter().collect(),
            enabled: bool = true,
            created_at_ms: u64 = 0,
        }
        option {
            deleted_at_ms: u64 = None,
        }
        computed {
            id: RunnerId = RunnerId::new(),
            etag: Etag = Etag::wildcard(),
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
