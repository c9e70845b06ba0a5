// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform CRUD over one resource kind.
//!
//! Soft-deleted rows are excluded from reads and listings by default;
//! `read_by_id` returns them unless the resource kind declares itself
//! unreachable. Standard error mapping: duplicate id → `AlreadyExists`,
//! missing row → `NotFound`, stale etag → `OptimisticLockFailed`.

use derrick_core::{Error, Etag, MutableResource, Resource, Result};
use std::collections::HashMap;

/// How many times `upsert` retries its read-modify-write cycle when the
/// compare-and-swap loses a race before surfacing `OptimisticLockFailed`.
pub const UPSERT_RETRY_BOUND: usize = 5;

#[derive(Debug, Clone)]
pub struct Table<T: Resource> {
    rows: HashMap<T::Id, T>,
}

impl<T: Resource> Default for Table<T> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<T: Resource> Table<T> {
    /// Insert a new row. The row's id must be unused.
    pub fn create(&mut self, mut row: T, now_ms: u64) -> Result<T> {
        if self.rows.contains_key(&row.id()) {
            return Err(Error::already_exists(format!("{} {}", T::KIND, row.id())));
        }
        if row.created_at_ms() == 0 {
            row.set_created_at_ms(now_ms);
        }
        self.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    /// A live (non-deleted) row, by id.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id).filter(|r| !r.is_deleted())
    }

    /// A live row, by id, or `NotFound`.
    pub fn read(&self, id: T::Id) -> Result<T> {
        self.get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} {}", T::KIND, id)))
    }

    /// A row by id regardless of soft-deletion, unless the kind declares
    /// deleted rows unreachable.
    pub fn read_by_id(&self, id: T::Id) -> Result<T> {
        match self.rows.get(&id) {
            Some(row) if !row.is_deleted() || T::REACHABLE_WHEN_DELETED => Ok(row.clone()),
            _ => Err(Error::not_found(format!("{} {}", T::KIND, id))),
        }
    }

    /// Overwrite a row unconditionally, refreshing its etag. Internal write
    /// path for rows already read inside the current write transaction.
    pub fn put(&mut self, mut row: T)
    where
        T: MutableResource,
    {
        row.refresh_etag();
        self.rows.insert(row.id(), row);
    }

    /// Overwrite a row that carries no etag.
    pub fn put_immutable(&mut self, row: T) {
        self.rows.insert(row.id(), row);
    }

    /// Compare-and-swap update: the stored etag must match `expected`
    /// (sentinel `"*"` bypasses). The new etag is computed from the incoming
    /// content.
    pub fn update(&mut self, mut row: T, expected: &Etag) -> Result<T>
    where
        T: MutableResource,
    {
        let current = self
            .get(row.id())
            .ok_or_else(|| Error::not_found(format!("{} {}", T::KIND, row.id())))?;
        if !expected.matches(current.etag()) {
            return Err(Error::OptimisticLockFailed(format!(
                "{} {} changed concurrently",
                T::KIND,
                row.id()
            )));
        }
        row.refresh_etag();
        self.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    /// Mark a live row deleted.
    pub fn soft_delete(&mut self, id: T::Id, now_ms: u64) -> Result<()> {
        let row = self
            .rows
            .get_mut(&id)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| Error::not_found(format!("{} {}", T::KIND, id)))?;
        row.set_deleted_at_ms(Some(now_ms));
        Ok(())
    }

    /// Remove a row entirely.
    pub fn delete(&mut self, id: T::Id) -> Result<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("{} {}", T::KIND, id)))
    }

    /// The first live row matching `pred`, or a freshly created one.
    /// Returns `(row, created)`.
    pub fn find_or_create(
        &mut self,
        pred: impl Fn(&T) -> bool,
        make: impl FnOnce() -> T,
        now_ms: u64,
    ) -> Result<(T, bool)> {
        if let Some(found) = self.iter_live().find(|r| pred(r)) {
            return Ok((found.clone(), false));
        }
        let row = self.create(make(), now_ms)?;
        Ok((row, true))
    }

    /// Insert-or-update by id. Returns `(created, updated)`; an unchanged
    /// row reports `(false, false)`.
    ///
    /// A create losing to a concurrent create falls through to the read
    /// path; an update losing its compare-and-swap re-reads and retries up
    /// to [`UPSERT_RETRY_BOUND`] times before surfacing
    /// `OptimisticLockFailed`. The whole-database write lock makes both
    /// races unreachable on this engine, but row-locking engines hit them.
    pub fn upsert(&mut self, row: T, now_ms: u64) -> Result<(T, bool, bool)>
    where
        T: MutableResource,
    {
        match self.create(row.clone(), now_ms) {
            Ok(created) => return Ok((created, true, false)),
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(e),
        }

        let mut last = Error::OptimisticLockFailed(format!("{} {}", T::KIND, row.id()));
        for _ in 0..UPSERT_RETRY_BOUND {
            let current = self.read(row.id())?;
            if *current.etag() == row.content_etag() {
                return Ok((current, false, false));
            }
            let expected = current.etag().clone();
            match self.update(row.clone(), &expected) {
                Ok(updated) => return Ok((updated, false, true)),
                Err(e) if e.is_optimistic_lock_failed() => last = e,
                Err(e) => return Err(e),
            }
        }
        Err(last)
    }

    /// Live rows, in arbitrary order.
    pub fn iter_live(&self) -> impl Iterator<Item = &T> {
        self.rows.values().filter(|r| !r.is_deleted())
    }

    /// Every row including soft-deleted ones.
    pub fn iter_all(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
