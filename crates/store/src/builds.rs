// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over builds.

use crate::cursor::{paginate, Page, PageRequest};
use crate::db::Database;
use derrick_core::{Build, BuildId, MutableResource, RepoId, Result};

impl Database {
    /// Insert a build, assigning the repo's next build number.
    pub fn insert_build(&mut self, mut build: Build, now_ms: u64) -> Result<Build> {
        self.repos.read(build.repo_id)?;
        let counter = self.build_counters.entry(build.repo_id).or_insert(0);
        *counter += 1;
        build.build_number = *counter;
        build.refresh_etag();
        let build = self.builds.create(build, now_ms)?;
        self.create_ownership(build.repo_id, build.id, now_ms)?;
        Ok(build)
    }

    pub fn read_build(&self, id: BuildId) -> Result<Build> {
        self.builds.read(id)
    }

    /// Read a build with the intent to update it.
    ///
    /// The build row is the single serialisation point for roll-up status.
    /// On a row-locking engine this is `SELECT … FOR UPDATE`; here the
    /// caller already holds the process-wide write lock, so the read is
    /// exclusive by construction.
    pub fn read_build_for_update(&mut self, id: BuildId) -> Result<Build> {
        self.builds.read(id)
    }

    /// Unconditional write of a build already read inside this transaction.
    pub fn put_build(&mut self, build: Build) {
        self.builds.put(build);
    }

    /// Builds of a repo, newest first, cursor-paginated.
    pub fn list_builds_for_repo(
        &self,
        repo_id: RepoId,
        request: &PageRequest,
    ) -> Result<Page<Build>> {
        let rows: Vec<Build> =
            self.builds.iter_live().filter(|b| b.repo_id == repo_id).cloned().collect();
        paginate(rows, request, |b| (b.created_at_ms, b.id.as_str().to_string()))
    }
}
