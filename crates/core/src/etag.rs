// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-hash ETags for optimistic concurrency.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encode a byte slice.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Sha-256 of arbitrary bytes, hex-encoded.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex(&hasher.finalize())
}

/// Deterministic hash of a resource's content fields, used as the
/// compare-and-swap token on updates.
///
/// The sentinel value `"*"` bypasses the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Etag(String);

impl Etag {
    pub const WILDCARD: &'static str = "*";

    /// The bypass sentinel.
    pub fn wildcard() -> Self {
        Etag(Self::WILDCARD.to_string())
    }

    /// Compute the etag of a serializable content projection.
    ///
    /// Callers must exclude the etag itself, timestamps and volatile fields
    /// from the projection; collection fields must have deterministic order.
    pub fn of<T: Serialize>(content: &T) -> Self {
        match serde_json::to_vec(content) {
            Ok(bytes) => Etag(sha256_hex(&bytes)),
            // Serialization of plain data cannot fail.
            Err(_) => Etag(String::from("!unhashable")),
        }
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Etag(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    /// Compare-and-swap check: true when either side is the wildcard or the
    /// values are equal.
    pub fn matches(&self, other: &Etag) -> bool {
        self.is_wildcard() || other.is_wildcard() || self.0 == other.0
    }
}

impl Default for Etag {
    fn default() -> Self {
        Etag(String::new())
    }
}

impl std::fmt::Display for Etag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "etag_tests.rs"]
mod tests;
