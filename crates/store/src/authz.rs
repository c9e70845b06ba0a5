// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorisation: grants ∪ group-grants evaluated against the ownership
//! closure of the target resource.

use crate::db::Database;
use derrick_core::{Grantee, IdentityId, Operation, ResourceId};
use std::collections::BTreeSet;

impl Database {
    /// The target resource plus its chain of owners, walked through parent
    /// links and bounded by `max_depth`. Ownership is a forest by
    /// construction, so the walk terminates; the bound guards corrupted
    /// data.
    pub fn ownership_closure(&self, target: ResourceId, max_depth: usize) -> Vec<ResourceId> {
        let mut closure = vec![target];
        let mut current = target;
        for _ in 0..max_depth {
            match self.owner_of(current) {
                Some(owner) if !closure.contains(&owner) => {
                    closure.push(owner);
                    current = owner;
                }
                _ => break,
            }
        }
        closure
    }

    /// Number of grants authorising `identity` to perform `operation`
    /// anywhere in the ownership closure of `target`, directly or through a
    /// group membership. The caller turns the count into a yes/no.
    ///
    /// A grant applies only when its operation's kind matches the target
    /// resource's kind.
    pub fn authorized_count(
        &self,
        identity_id: IdentityId,
        operation: Operation,
        target: ResourceId,
        max_depth: usize,
    ) -> usize {
        if target.kind() != Some(operation.kind) {
            return 0;
        }
        let closure: BTreeSet<ResourceId> =
            self.ownership_closure(target, max_depth).into_iter().collect();
        let groups: BTreeSet<_> = self.groups_of_identity(identity_id).into_iter().collect();

        self.grants
            .iter_live()
            .filter(|grant| grant.operation == operation)
            .filter(|grant| match grant.grantee {
                Grantee::Identity(id) => id == identity_id,
                Grantee::Group(group_id) => groups.contains(&group_id),
            })
            .filter(|grant| closure.contains(&grant.target_resource_id))
            .count()
    }

    /// Whether `identity` may perform `operation` on `target`.
    pub fn is_authorized(
        &self,
        identity_id: IdentityId,
        operation: Operation,
        target: ResourceId,
        max_depth: usize,
    ) -> bool {
        self.authorized_count(identity_id, operation, target, max_depth) > 0
    }

    /// Keep only the resources the identity may perform `operation` on.
    /// Listing queries pipe their result sets through this so authorisation
    /// filters them naturally.
    pub fn filter_authorized(
        &self,
        identity_id: IdentityId,
        operation: Operation,
        resources: Vec<ResourceId>,
        max_depth: usize,
    ) -> Vec<ResourceId> {
        resources
            .into_iter()
            .filter(|r| self.is_authorized(identity_id, operation, *r, max_depth))
            .collect()
    }
}

#[cfg(test)]
#[path = "authz_tests.rs"]
mod tests;
