// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorisation scenarios: transitive grants through groups and
//! ownership.

use crate::support::world;
use derrick_core::{Grant, Grantee, Operation, ResourceKind};

const DEPTH: usize = 32;
const SOURCE: &str = "directory-sync";

#[test]
fn group_grant_on_the_entity_reaches_its_repo_transitively() {
    let w = world();
    let identity = w
        .engine
        .store()
        .read(|db| db.identity_for_owner(w.entity.id.into()))
        .unwrap();
    let read_repo = Operation::read(ResourceKind::Repo);

    w.engine
        .store()
        .write(|db| {
            let group = db.create_group(w.entity.id, "auditors", 100)?;
            db.create_grant(
                Grant::new(Grantee::Group(group.id), read_repo, w.entity.id, identity.id),
                100,
            )?;
            db.add_group_membership(group.id, identity.id, SOURCE, 100)?;
            Ok(())
        })
        .unwrap();

    // Repo is owned by the entity, the grant targets the entity, the
    // identity reaches the grant through the group: authorised.
    assert!(w
        .engine
        .store()
        .read(|db| db.is_authorized(identity.id, read_repo, w.repo.id.into(), DEPTH)));

    // Removing the membership for its source system revokes access.
    w.engine
        .store()
        .write(|db| {
            let group = db.find_group(w.entity.id, "auditors")?;
            db.remove_group_membership(group.id, identity.id, SOURCE);
            Ok(())
        })
        .unwrap();
    assert!(!w
        .engine
        .store()
        .read(|db| db.is_authorized(identity.id, read_repo, w.repo.id.into(), DEPTH)));
}

#[test]
fn runner_identities_join_the_runner_group_automatically() {
    let w = world();
    w.engine.store().read(|db| {
        let identity = db.identity_for_owner(w.runner.id.into()).unwrap();
        let group = db.find_group(w.entity.id, derrick_core::RUNNER_GROUP).unwrap();
        assert_eq!(db.groups_of_identity(identity.id), vec![group.id]);
    });
}
