// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact signed tokens binding a dequeue to a build's transient identity.
//!
//! Format: `<identity_id>.<expires_at_ms>.<signature>` where the signature
//! is a keyed sha-256 over the first two fields. Verification needs only
//! the server secret, no store round-trip.

use derrick_core::etag::sha256_hex;
use derrick_core::{Error, IdentityId, Result};

fn signature(secret: &[u8], payload: &str) -> String {
    let mut keyed = Vec::with_capacity(secret.len() + 1 + payload.len());
    keyed.extend_from_slice(secret);
    keyed.push(b'.');
    keyed.extend_from_slice(payload.as_bytes());
    sha256_hex(&keyed)
}

/// Mint a token for `identity_id` valid until `expires_at_ms`.
pub fn mint(secret: &[u8], identity_id: IdentityId, expires_at_ms: u64) -> String {
    let payload = format!("{identity_id}.{expires_at_ms}");
    let sig = signature(secret, &payload);
    format!("{payload}.{sig}")
}

/// Verify a token and return the identity it is bound to.
///
/// Produces `ValidationFailed` for malformed or tampered tokens and
/// `Timeout` for expired ones.
pub fn verify(secret: &[u8], token: &str, now_ms: u64) -> Result<IdentityId> {
    let bad = || Error::validation("malformed token");
    let mut parts = token.splitn(3, '.');
    let identity = parts.next().ok_or_else(bad)?;
    let expires = parts.next().ok_or_else(bad)?;
    let sig = parts.next().ok_or_else(bad)?;

    let payload = format!("{identity}.{expires}");
    if signature(secret, &payload) != sig {
        return Err(Error::validation("token signature mismatch"));
    }
    let expires_at_ms: u64 = expires.parse().map_err(|_| bad())?;
    if expires_at_ms <= now_ms {
        return Err(Error::Timeout("token expired".to_string()));
    }
    Ok(IdentityId::from_string(identity))
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
