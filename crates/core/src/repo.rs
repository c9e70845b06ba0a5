// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repositories and commits.

use crate::etag::Etag;
use crate::id::ResourceKind;
use crate::resource::MutableResource;
use crate::principal::LegalEntityId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a repository.
    pub struct RepoId(ResourceKind::Repo);
}

crate::define_id! {
    /// Unique identifier for a commit.
    pub struct CommitId(ResourceKind::Commit);
}

/// A source repository owned by a legal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: RepoId,
    pub legal_entity_id: LegalEntityId,
    pub name: String,
    /// Ref built when a submission names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ref: Option<String>,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Repo, RepoId, ResourceKind::Repo }

impl Repo {
    pub fn new(legal_entity_id: LegalEntityId, name: impl Into<String>) -> Self {
        let mut repo = Self {
            id: RepoId::new(),
            legal_entity_id,
            name: name.into(),
            default_ref: None,
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        repo.etag = repo.content_etag();
        repo
    }
}

impl MutableResource for Repo {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(&self.legal_entity_id, &self.name, &self.default_ref))
    }
}

/// A commit in a repository, carrying its build-definition payload as
/// opaque bytes plus a format tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub repo_id: RepoId,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Build-definition document as submitted.
    #[serde(default)]
    pub definition: Vec<u8>,
    /// Content tag selecting the definition parser ("json", "toml", ...).
    #[serde(default)]
    pub definition_format: String,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Commit, CommitId, ResourceKind::Commit }

impl Commit {
    pub fn new(repo_id: RepoId, sha: impl Into<String>) -> Self {
        Self {
            id: CommitId::new(),
            repo_id,
            sha: sha.into(),
            message: None,
            author_name: None,
            definition: Vec::new(),
            definition_format: String::new(),
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    pub fn with_definition(mut self, format: impl Into<String>, definition: Vec<u8>) -> Self {
        self.definition_format = format.into();
        self.definition = definition;
        self
    }
}
