// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use derrick_core::Error;

#[test]
fn committed_writes_are_visible() {
    let store = Store::new();
    store.write(|db| db.create_legal_entity("acme", 100).map(|_| ())).unwrap();
    let count = store.read(|db| db.legal_entities.iter_live().count());
    assert_eq!(count, 1);
}

#[test]
fn failed_transactions_roll_back_everything() {
    let store = Store::new();
    let err = store
        .write(|db| {
            db.create_legal_entity("acme", 100)?;
            db.create_legal_entity("globex", 100)?;
            Err::<(), _>(Error::internal("boom"))
        })
        .unwrap_err();
    assert_eq!(err, Error::Internal("boom".to_string()));

    // Neither entity nor their seeded groups survived.
    store.read(|db| {
        assert_eq!(db.legal_entities.iter_live().count(), 0);
        assert_eq!(db.groups.iter_live().count(), 0);
        assert!(db.ownerships.is_empty());
    });
}

#[test]
fn clones_share_the_database() {
    let store = Store::new();
    let other = store.clone();
    store.write(|db| db.create_legal_entity("acme", 100).map(|_| ())).unwrap();
    assert_eq!(other.read(|db| db.legal_entities.iter_live().count()), 1);
}

#[test]
fn engine_reports_no_row_level_locking() {
    assert!(!Store::new().supports_row_level_locking());
}
