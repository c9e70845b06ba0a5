// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-build sequenced events driving downstream consumers.

use crate::build::BuildId;
use crate::id::{ResourceId, ResourceKind};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an event row.
    pub struct EventId(ResourceKind::Event);
}

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BuildStatusChanged,
    JobStatusChanged,
    StepStatusChanged,
}

crate::simple_display! {
    EventKind {
        BuildStatusChanged => "build_status_changed",
        JobStatusChanged => "job_status_changed",
        StepStatusChanged => "step_status_changed",
    }
}

/// One event in a build's log.
///
/// `sequence` is strictly increasing within the build (gaps permitted) and
/// allocated by an atomic counter inside the transaction that commits the
/// state change, so an event is visible only once its state change is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub build_id: BuildId,
    pub sequence: u64,
    pub kind: EventKind,
    /// The build, job or step the event refers to.
    pub resource_id: ResourceId,
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    /// Compact textual form of the new status.
    pub payload: String,
    pub created_at_ms: u64,
}

impl Event {
    pub fn new(
        build_id: BuildId,
        kind: EventKind,
        resource_id: impl Into<ResourceId>,
        resource_name: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            build_id,
            sequence: 0,
            kind,
            resource_id: resource_id.into(),
            resource_name: resource_name.into(),
            workflow: None,
            job_name: None,
            payload: payload.into(),
            created_at_ms: 0,
        }
    }

    pub fn with_job(mut self, workflow: impl Into<String>, job_name: impl Into<String>) -> Self {
        self.workflow = Some(workflow.into());
        self.job_name = Some(job_name.into());
        self
    }
}
