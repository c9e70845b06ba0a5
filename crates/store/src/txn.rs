// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transactional store façade.
//!
//! This engine has no row-level locks: write transactions are serialised
//! process-wide behind a single writer lock (reads share a read lock), the
//! moral equivalent of an embedded database running one write transaction
//! at a time. `supports_row_level_locking` reports `false` so callers know
//! `read_*_for_update` reads are already exclusive. Rollback restores a
//! snapshot taken at transaction start.

use crate::db::Database;
use derrick_core::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to the store. Clones share the same database.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Database>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the engine takes per-row locks (`SELECT … FOR UPDATE`).
    ///
    /// False here: the process-wide write lock serialises every write
    /// transaction, so row locks would be redundant. Engines that do
    /// row-lock need retry loops around read-modify-write cycles at
    /// read-committed isolation.
    pub fn supports_row_level_locking(&self) -> bool {
        false
    }

    /// Run a read-only transaction. Concurrent readers are admitted.
    pub fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let db = self.inner.read();
        f(&db)
    }

    /// Run a write transaction: exclusive access, committed on `Ok`,
    /// rolled back to the starting snapshot on `Err`.
    pub fn write<R>(&self, f: impl FnOnce(&mut Database) -> Result<R>) -> Result<R> {
        let mut db = self.inner.write();
        let snapshot = db.clone();
        match f(&mut db) {
            Ok(value) => Ok(value),
            Err(e) => {
                *db = snapshot;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "txn_tests.rs"]
mod tests;
