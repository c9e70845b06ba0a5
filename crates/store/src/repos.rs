// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over repositories and commits.

use crate::db::Database;
use derrick_core::{Commit, CommitId, Error, Repo, RepoId, Result};

impl Database {
    /// Create a repo, owned by its legal entity. `name` is unique within
    /// the entity among non-deleted repos.
    pub fn create_repo(&mut self, repo: Repo, now_ms: u64) -> Result<Repo> {
        self.legal_entities.read(repo.legal_entity_id)?;
        if self
            .repos
            .iter_live()
            .any(|r| r.legal_entity_id == repo.legal_entity_id && r.name == repo.name)
        {
            return Err(Error::already_exists(format!("repo '{}'", repo.name)));
        }
        let repo = self.repos.create(repo, now_ms)?;
        self.create_ownership(repo.legal_entity_id, repo.id, now_ms)?;
        Ok(repo)
    }

    pub fn read_repo(&self, id: RepoId) -> Result<Repo> {
        self.repos.read(id)
    }

    /// Create a commit under its repo.
    pub fn create_commit(&mut self, commit: Commit, now_ms: u64) -> Result<Commit> {
        self.repos.read(commit.repo_id)?;
        let commit = self.commits.create(commit, now_ms)?;
        self.create_ownership(commit.repo_id, commit.id, now_ms)?;
        Ok(commit)
    }

    pub fn read_commit(&self, id: CommitId) -> Result<Commit> {
        self.commits.read(id)
    }
}
