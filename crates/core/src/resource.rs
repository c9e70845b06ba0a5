// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Common traits over persistent resources.

use crate::etag::Etag;
use crate::id::ResourceKind;

/// A persistent resource: globally unique kind-prefixed id, creation
/// timestamp, optional soft-delete marker.
pub trait Resource: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + std::hash::Hash + Ord + std::fmt::Display;

    const KIND: ResourceKind;

    /// Whether `read_by_id` may still return this resource after
    /// soft-deletion. Resources carrying secrets declare themselves
    /// unreachable.
    const REACHABLE_WHEN_DELETED: bool = true;

    fn id(&self) -> Self::Id;
    fn created_at_ms(&self) -> u64;
    fn set_created_at_ms(&mut self, at_ms: u64);
    fn deleted_at_ms(&self) -> Option<u64>;
    fn set_deleted_at_ms(&mut self, at_ms: Option<u64>);

    fn is_deleted(&self) -> bool {
        self.deleted_at_ms().is_some()
    }
}

/// A resource updated under optimistic concurrency.
pub trait MutableResource: Resource {
    fn etag(&self) -> &Etag;
    fn set_etag(&mut self, etag: Etag);

    /// Recompute the etag from the resource's content fields.
    fn content_etag(&self) -> Etag;

    /// Stamp the stored etag from the current content.
    fn refresh_etag(&mut self) {
        let etag = self.content_etag();
        self.set_etag(etag);
    }
}
