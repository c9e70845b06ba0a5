// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Principals and permissions: legal entities, identities, credentials,
//! groups, grants and the ownership relation that authorisation walks.

use crate::etag::Etag;
use crate::id::{ResourceId, ResourceKind};
use crate::resource::MutableResource;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a legal entity (user or organisation).
    pub struct LegalEntityId(ResourceKind::LegalEntity);
}

crate::define_id! {
    /// Unique identifier for an authenticatable identity.
    pub struct IdentityId(ResourceKind::Identity);
}

crate::define_id! {
    /// Unique identifier for a credential attached to an identity.
    pub struct CredentialId(ResourceKind::Credential);
}

crate::define_id! {
    /// Unique identifier for a group within a legal entity.
    pub struct GroupId(ResourceKind::Group);
}

crate::define_id! {
    /// Unique identifier for a grant.
    pub struct GrantId(ResourceKind::Grant);
}

/// Names of the groups seeded for every legal entity.
pub const STANDARD_GROUPS: [&str; 4] = ["admin", "user", "read-only-user", "runner"];

/// The seeded group runner identities join automatically.
pub const RUNNER_GROUP: &str = "runner";

/// A principal that owns repos, runners and groups.
///
/// `name` is unique among non-deleted legal entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    pub id: LegalEntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { LegalEntity, LegalEntityId, ResourceKind::LegalEntity }

impl LegalEntity {
    pub fn new(name: impl Into<String>) -> Self {
        let mut entity = Self {
            id: LegalEntityId::new(),
            name: name.into(),
            display_name: None,
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        entity.etag = entity.content_etag();
        entity
    }
}

impl MutableResource for LegalEntity {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(&self.name, &self.display_name))
    }
}

/// An authenticatable handle owned by exactly one resource (legal entity,
/// runner, or a build's transient identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    /// The resource this identity belongs to.
    pub owner_resource_id: ResourceId,
    pub name: String,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Identity, IdentityId, ResourceKind::Identity }

impl Identity {
    pub fn new(owner: impl Into<ResourceId>, name: impl Into<String>) -> Self {
        Self {
            id: IdentityId::new(),
            owner_resource_id: owner.into(),
            name: name.into(),
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }
}

/// Secret material bound to an identity. Flat data, one variant per
/// authentication mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialPayload {
    /// Salted hash of a shared secret.
    SharedSecret { salt: String, secret_hash: String },
    /// Subject asserted by an external OIDC issuer.
    OidcSubject { issuer: String, subject: String },
    /// Public-key fingerprint plus the certificate itself.
    ClientCertificate {
        fingerprint: String,
        certificate_der: Vec<u8>,
    },
}

/// One credential for one identity.
///
/// Soft-deleted credentials are unreachable: secrets disappear the moment
/// they are revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub identity_id: IdentityId,
    pub payload: CredentialPayload,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Credential, CredentialId, ResourceKind::Credential, unreachable_when_deleted }

impl Credential {
    pub fn new(identity_id: IdentityId, payload: CredentialPayload) -> Self {
        Self {
            id: CredentialId::new(),
            identity_id,
            payload,
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    /// Build a shared-secret credential, salting and hashing the secret.
    pub fn shared_secret(identity_id: IdentityId, secret: &str) -> Self {
        let salt = nanoid::nanoid!(16);
        let secret_hash = crate::etag::sha256_hex(format!("{salt}{secret}").as_bytes());
        Self::new(identity_id, CredentialPayload::SharedSecret { salt, secret_hash })
    }

    /// Build a client-certificate credential from DER bytes.
    pub fn client_certificate(identity_id: IdentityId, certificate_der: Vec<u8>) -> Self {
        let fingerprint = crate::etag::sha256_hex(&certificate_der);
        Self::new(
            identity_id,
            CredentialPayload::ClientCertificate { fingerprint, certificate_der },
        )
    }

    /// Check a presented shared secret against this credential.
    /// Always false for non-secret credential kinds.
    pub fn matches_secret(&self, secret: &str) -> bool {
        match &self.payload {
            CredentialPayload::SharedSecret { salt, secret_hash } => {
                crate::etag::sha256_hex(format!("{salt}{secret}").as_bytes()) == *secret_hash
            }
            _ => false,
        }
    }
}

/// A named collection of identities within a legal entity.
///
/// `(legal_entity_id, name)` is unique among non-deleted groups. Standard
/// groups are system-seeded; custom groups are user-created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub legal_entity_id: LegalEntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// True for the system-seeded groups.
    pub standard: bool,
    pub etag: Etag,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Group, GroupId, ResourceKind::Group }

impl Group {
    pub fn new(legal_entity_id: LegalEntityId, name: impl Into<String>, standard: bool) -> Self {
        let mut group = Self {
            id: GroupId::new(),
            legal_entity_id,
            name: name.into(),
            description: None,
            standard,
            etag: Etag::default(),
            created_at_ms: 0,
            deleted_at_ms: None,
        };
        group.etag = group.content_etag();
        group
    }
}

impl MutableResource for Group {
    fn etag(&self) -> &Etag {
        &self.etag
    }

    fn set_etag(&mut self, etag: Etag) {
        self.etag = etag;
    }

    fn content_etag(&self) -> Etag {
        Etag::of(&(&self.legal_entity_id, &self.name, &self.description, self.standard))
    }
}

/// Membership of one identity in one group, attributed to a source system.
///
/// The same identity may be a member of the same group via several source
/// systems; removal is per source system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: GroupId,
    pub identity_id: IdentityId,
    /// Which system asserted this membership ("api", "scim", ...).
    pub source_system: String,
    pub created_at_ms: u64,
}

impl GroupMembership {
    pub fn new(
        group_id: GroupId,
        identity_id: IdentityId,
        source_system: impl Into<String>,
    ) -> Self {
        Self {
            group_id,
            identity_id,
            source_system: source_system.into(),
            created_at_ms: 0,
        }
    }

    /// Composite uniqueness key.
    pub fn key(group_id: GroupId, identity_id: IdentityId, source_system: &str) -> String {
        format!("{group_id}/{identity_id}/{source_system}")
    }
}

/// The verb component of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

crate::simple_display! {
    Verb {
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",
    }
}

/// An operation a grant can authorise: a verb applied to a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub kind: ResourceKind,
    pub verb: Verb,
}

impl Operation {
    pub fn new(kind: ResourceKind, verb: Verb) -> Self {
        Self { kind, verb }
    }

    pub fn read(kind: ResourceKind) -> Self {
        Self::new(kind, Verb::Read)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.verb)
    }
}

/// The authorised party of a grant: exactly one of an identity or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grantee {
    Identity(IdentityId),
    Group(GroupId),
}

impl Grantee {
    pub fn as_str(&self) -> &str {
        match self {
            Grantee::Identity(id) => id.as_str(),
            Grantee::Group(id) => id.as_str(),
        }
    }
}

/// Explicit permission: `grantee` may perform `operation` on
/// `target_resource_id` and everything it transitively owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub grantee: Grantee,
    pub operation: Operation,
    pub target_resource_id: ResourceId,
    pub granted_by: IdentityId,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

crate::impl_resource! { Grant, GrantId, ResourceKind::Grant }

impl Grant {
    pub fn new(
        grantee: Grantee,
        operation: Operation,
        target: impl Into<ResourceId>,
        granted_by: IdentityId,
    ) -> Self {
        Self {
            id: GrantId::new(),
            grantee,
            operation,
            target_resource_id: target.into(),
            granted_by,
            created_at_ms: 0,
            deleted_at_ms: None,
        }
    }

    /// Uniqueness key coalescing the grantee with operation and target.
    pub fn dedup_key(&self) -> String {
        format!("{}/{}/{}", self.grantee.as_str(), self.operation, self.target_resource_id)
    }
}

/// Parent-child relation between resources. Each resource has at most one
/// owner; the relation forms a forest and authorisation walks parent links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub owner_resource_id: ResourceId,
    pub owned_resource_id: ResourceId,
    pub created_at_ms: u64,
}

impl Ownership {
    pub fn new(owner: impl Into<ResourceId>, owned: impl Into<ResourceId>) -> Self {
        Self {
            owner_resource_id: owner.into(),
            owned_resource_id: owned.into(),
            created_at_ms: 0,
        }
    }
}

#[cfg(test)]
#[path = "principal_tests.rs"]
mod tests;
