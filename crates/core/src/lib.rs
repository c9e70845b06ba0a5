// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! derrick-core: data model for the Derrick build-orchestration server

pub mod macros;

pub mod build;
pub mod clock;
pub mod config;
pub mod error;
pub mod etag;
pub mod event;
pub mod graph;
pub mod id;
pub mod job;
pub mod logs;
pub mod principal;
pub mod repo;
pub mod resource;
pub mod runner;
pub mod status;
pub mod step;
pub mod work;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use build::{Build, BuildId, BuildOptions, NodeRef};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{EngineConfig, Limits};
pub use error::{Error, Result};
pub use etag::Etag;
pub use event::{Event, EventId, EventKind};
pub use graph::{definition_hash, step_topo_order, BuildGraph, JobGraph};
pub use id::{ResourceId, ResourceKind};
pub use job::{
    ArtifactDefinition, Job, JobDependency, JobId, JobType, ServiceDefinition, StepExecution,
};
pub use logs::{Artifact, ArtifactId, LogDescriptor, LogDescriptorId};
pub use principal::{
    Credential, CredentialId, CredentialPayload, Grant, GrantId, Grantee, Group, GroupId,
    GroupMembership, Identity, IdentityId, LegalEntity, LegalEntityId, Operation, Ownership, Verb,
    RUNNER_GROUP, STANDARD_GROUPS,
};
pub use repo::{Commit, CommitId, Repo, RepoId};
pub use resource::{MutableResource, Resource};
pub use runner::{Runner, RunnerId};
pub use status::{Status, WorkflowTimings};
pub use step::{Step, StepDependency, StepId};
pub use work::{WorkItem, WorkItemId, WorkItemState, WorkItemStateId, WorkItemStatus};
