// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries over principals: legal entities, identities, credentials,
//! groups, memberships, grants and ownership rows.

use crate::db::Database;
use derrick_core::{
    Credential, CredentialId, Error, Grant, Group, GroupId, GroupMembership, Identity, IdentityId,
    LegalEntity, LegalEntityId, Ownership, ResourceId, Result, STANDARD_GROUPS,
};

impl Database {
    /// Create a legal entity with its standard groups and its own identity.
    ///
    /// `name` is unique among non-deleted entities. Produces
    /// `AlreadyExists`.
    pub fn create_legal_entity(&mut self, name: &str, now_ms: u64) -> Result<LegalEntity> {
        if self.legal_entities.iter_live().any(|e| e.name == name) {
            return Err(Error::already_exists(format!("legal entity '{name}'")));
        }
        let entity = self.legal_entities.create(LegalEntity::new(name), now_ms)?;
        for group_name in STANDARD_GROUPS {
            let group = self.groups.create(Group::new(entity.id, group_name, true), now_ms)?;
            self.create_ownership(entity.id, group.id, now_ms)?;
        }
        self.create_identity(entity.id, name, now_ms)?;
        Ok(entity)
    }

    pub fn read_legal_entity(&self, id: LegalEntityId) -> Result<LegalEntity> {
        self.legal_entities.read(id)
    }

    /// Create an identity owned by `owner`, with its ownership row.
    pub fn create_identity(
        &mut self,
        owner: impl Into<ResourceId>,
        name: &str,
        now_ms: u64,
    ) -> Result<Identity> {
        let identity = self.identities.create(Identity::new(owner, name), now_ms)?;
        self.create_ownership(identity.owner_resource_id, identity.id, now_ms)?;
        Ok(identity)
    }

    pub fn read_identity(&self, id: IdentityId) -> Result<Identity> {
        self.identities.read(id)
    }

    /// The identity owned by `owner`, if any.
    pub fn identity_for_owner(&self, owner: ResourceId) -> Option<Identity> {
        self.identities.iter_live().find(|i| i.owner_resource_id == owner).cloned()
    }

    /// The identity owned by `owner`, created on first use.
    /// Returns `(identity, created)`.
    pub fn find_or_create_identity(
        &mut self,
        owner: impl Into<ResourceId>,
        name: &str,
        now_ms: u64,
    ) -> Result<(Identity, bool)> {
        let owner = owner.into();
        if let Some(existing) = self.identity_for_owner(owner) {
            return Ok((existing, false));
        }
        let identity = self.create_identity(owner, name, now_ms)?;
        Ok((identity, true))
    }

    /// Hard-delete an identity along with its credentials, memberships and
    /// ownership row.
    pub fn delete_identity(&mut self, id: IdentityId) -> Result<()> {
        let identity = self.identities.read(id)?;
        let credential_ids: Vec<CredentialId> =
            self.credentials_for_identity(id).into_iter().map(|c| c.id).collect();
        for credential_id in credential_ids {
            self.credentials.delete(credential_id)?;
        }
        self.memberships.retain(|_, m| m.identity_id != id);
        self.remove_ownership(identity.id.into());
        self.identities.delete(id)
    }

    pub fn create_credential(&mut self, credential: Credential, now_ms: u64) -> Result<Credential> {
        self.identities.read(credential.identity_id)?;
        self.credentials.create(credential, now_ms)
    }

    pub fn credentials_for_identity(&self, identity_id: IdentityId) -> Vec<Credential> {
        let mut credentials: Vec<Credential> = self
            .credentials
            .iter_live()
            .filter(|c| c.identity_id == identity_id)
            .cloned()
            .collect();
        credentials.sort_by(|a, b| {
            (a.created_at_ms, a.id).cmp(&(b.created_at_ms, b.id))
        });
        credentials
    }

    pub fn delete_credential(&mut self, id: CredentialId) -> Result<()> {
        self.credentials.delete(id)
    }

    /// Create a custom group inside a legal entity.
    ///
    /// `(legal_entity_id, name)` is unique among non-deleted groups.
    pub fn create_group(
        &mut self,
        legal_entity_id: LegalEntityId,
        name: &str,
        now_ms: u64,
    ) -> Result<Group> {
        if self
            .groups
            .iter_live()
            .any(|g| g.legal_entity_id == legal_entity_id && g.name == name)
        {
            return Err(Error::already_exists(format!("group '{name}'")));
        }
        let group = self.groups.create(Group::new(legal_entity_id, name, false), now_ms)?;
        self.create_ownership(legal_entity_id, group.id, now_ms)?;
        Ok(group)
    }

    /// A live group by `(legal_entity, name)`.
    pub fn find_group(&self, legal_entity_id: LegalEntityId, name: &str) -> Result<Group> {
        self.groups
            .iter_live()
            .find(|g| g.legal_entity_id == legal_entity_id && g.name == name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("group '{name}'")))
    }

    /// Add `identity` to `group` via `source_system`. Idempotent.
    pub fn add_group_membership(
        &mut self,
        group_id: GroupId,
        identity_id: IdentityId,
        source_system: &str,
        now_ms: u64,
    ) -> Result<GroupMembership> {
        self.groups.read(group_id)?;
        self.identities.read(identity_id)?;
        let key = GroupMembership::key(group_id, identity_id, source_system);
        let membership = self.memberships.entry(key).or_insert_with(|| {
            let mut m = GroupMembership::new(group_id, identity_id, source_system);
            m.created_at_ms = now_ms;
            m
        });
        Ok(membership.clone())
    }

    /// Remove `identity` from `group` for one source system. Idempotent:
    /// removing an absent membership is a no-op.
    pub fn remove_group_membership(
        &mut self,
        group_id: GroupId,
        identity_id: IdentityId,
        source_system: &str,
    ) {
        let key = GroupMembership::key(group_id, identity_id, source_system);
        self.memberships.remove(&key);
    }

    /// Remove `identity` from `group` across every source system.
    pub fn remove_all_group_memberships(&mut self, group_id: GroupId, identity_id: IdentityId) {
        self.memberships
            .retain(|_, m| !(m.group_id == group_id && m.identity_id == identity_id));
    }

    /// Ids of every live group the identity belongs to, via any source
    /// system.
    pub fn groups_of_identity(&self, identity_id: IdentityId) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self
            .memberships
            .values()
            .filter(|m| m.identity_id == identity_id)
            .map(|m| m.group_id)
            .filter(|group_id| self.groups.get(*group_id).is_some())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Create a grant, deduplicated over (grantee, operation, target), plus
    /// the ownership row that hangs the grant off its target resource so
    /// viewing permissions on a resource yields its grants.
    pub fn create_grant(&mut self, grant: Grant, now_ms: u64) -> Result<Grant> {
        let key = grant.dedup_key();
        if self.grants.iter_live().any(|g| g.dedup_key() == key) {
            return Err(Error::already_exists(format!("grant {key}")));
        }
        let grant = self.grants.create(grant, now_ms)?;
        self.create_ownership(grant.target_resource_id, grant.id, now_ms)?;
        Ok(grant)
    }

    /// Record `owner` as the parent of `owned`. Each resource has at most
    /// one owner; a second owner is `AlreadyExists`.
    pub fn create_ownership(
        &mut self,
        owner: impl Into<ResourceId>,
        owned: impl Into<ResourceId>,
        now_ms: u64,
    ) -> Result<Ownership> {
        let owner = owner.into();
        let owned = owned.into();
        if self.ownerships.contains_key(&owned) {
            return Err(Error::already_exists(format!("ownership of {owned}")));
        }
        let mut ownership = Ownership::new(owner, owned);
        ownership.created_at_ms = now_ms;
        self.ownerships.insert(owned, ownership.clone());
        Ok(ownership)
    }

    /// The direct owner of a resource, if recorded.
    pub fn owner_of(&self, owned: ResourceId) -> Option<ResourceId> {
        self.ownerships.get(&owned).map(|o| o.owner_resource_id)
    }

    pub fn remove_ownership(&mut self, owned: ResourceId) {
        self.ownerships.remove(&owned);
    }
}

#[cfg(test)]
#[path = "principals_tests.rs"]
mod tests;
