// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory database: one table per resource kind plus the atomic
//! counters.
//!
//! Resource-family query methods live in sibling modules, all as `impl
//! Database` blocks.

use crate::table::Table;
use derrick_core::{
    Artifact, Build, BuildId, Commit, Credential, Event, Grant, Group, GroupMembership, Identity,
    Job, LegalEntity, LogDescriptor, Ownership, Repo, RepoId, ResourceId, Runner, Step, WorkItem,
    WorkItemState,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Database {
    pub(crate) legal_entities: Table<LegalEntity>,
    pub(crate) identities: Table<Identity>,
    pub(crate) credentials: Table<Credential>,
    pub(crate) groups: Table<Group>,
    /// Keyed by `GroupMembership::key` (group, identity, source system).
    pub(crate) memberships: HashMap<String, GroupMembership>,
    pub(crate) grants: Table<Grant>,
    /// Keyed by the owned resource: each resource has at most one owner.
    pub(crate) ownerships: HashMap<ResourceId, Ownership>,
    pub(crate) repos: Table<Repo>,
    pub(crate) commits: Table<Commit>,
    pub(crate) builds: Table<Build>,
    pub(crate) jobs: Table<Job>,
    pub(crate) steps: Table<Step>,
    pub(crate) runners: Table<Runner>,
    pub(crate) log_descriptors: Table<LogDescriptor>,
    pub(crate) artifacts: Table<Artifact>,
    /// Append-only; ordered by insertion within each build.
    pub(crate) events: Vec<Event>,
    /// Per-build sequence allocator backing the event log.
    pub(crate) event_counters: HashMap<BuildId, u64>,
    /// Per-repo build-number allocator.
    pub(crate) build_counters: HashMap<RepoId, u64>,
    pub(crate) work_items: Table<WorkItem>,
    pub(crate) work_item_states: Table<WorkItemState>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }
}
