// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyset pagination over `(created_at DESC, id DESC)`.
//!
//! A cursor is an opaque encoding of the boundary row's sort key plus a
//! direction. Queries read `limit + 1` rows to learn whether another page
//! exists. Previous-direction pages are assembled in ascending order and
//! then reversed, so callers always see newest-first output.

use derrick_core::{etag::hex, Error, Result};
use serde::{Deserialize, Serialize};

/// Hard ceiling on page sizes.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Default page size when the caller asks for none.
pub const DEFAULT_PAGE_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

/// Decoded boundary of a page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at_ms: u64,
    pub id: String,
    pub direction: Direction,
}

impl Cursor {
    /// Opaque token form.
    pub fn encode(&self) -> String {
        match serde_json::to_vec(self) {
            Ok(bytes) => hex(&bytes),
            // Serialization of plain data cannot fail.
            Err(_) => String::new(),
        }
    }

    /// Decode a token. Produces `InvalidQueryParameter` on garbage.
    pub fn decode(token: &str) -> Result<Cursor> {
        let bad = || Error::InvalidQueryParameter(format!("malformed cursor '{token}'"));
        if token.len() % 2 != 0 {
            return Err(bad());
        }
        let mut bytes = Vec::with_capacity(token.len() / 2);
        for i in (0..token.len()).step_by(2) {
            let pair = token.get(i..i + 2).ok_or_else(bad)?;
            bytes.push(u8::from_str_radix(pair, 16).map_err(|_| bad())?);
        }
        serde_json::from_slice(&bytes).map_err(|_| bad())
    }
}

/// One page of results plus navigation tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

/// A listing request: page size plus an optional cursor token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { limit: Some(limit), cursor: None }
    }

    pub fn after(token: impl Into<String>, limit: usize) -> Self {
        Self { limit: Some(limit), cursor: Some(token.into()) }
    }

    fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }
}

fn key_of<T>(row: &T, key: &impl Fn(&T) -> (u64, String)) -> (u64, String) {
    key(row)
}

/// Paginate `rows` by `(created_at DESC, id DESC)` keyset.
///
/// `key` extracts `(created_at_ms, id)` from a row. Produces
/// `InvalidQueryParameter` for malformed cursors.
pub fn paginate<T>(
    mut rows: Vec<T>,
    request: &PageRequest,
    key: impl Fn(&T) -> (u64, String),
) -> Result<Page<T>> {
    let limit = request.effective_limit();
    // Newest first: descending (created_at, id).
    rows.sort_by(|a, b| key_of(b, &key).cmp(&key_of(a, &key)));

    let cursor = match &request.cursor {
        Some(token) => Some(Cursor::decode(token)?),
        None => None,
    };

    let (mut window, direction): (Vec<T>, Direction) = match &cursor {
        None => (rows, Direction::Next),
        Some(c) => {
            let boundary = (c.created_at_ms, c.id.clone());
            match c.direction {
                Direction::Next => (
                    rows.into_iter().filter(|r| key_of(r, &key) < boundary).collect(),
                    Direction::Next,
                ),
                Direction::Prev => {
                    // Ascending scan of strictly-newer rows, reversed below.
                    let mut newer: Vec<T> =
                        rows.into_iter().filter(|r| key_of(r, &key) > boundary).collect();
                    newer.sort_by(|a, b| key_of(a, &key).cmp(&key_of(b, &key)));
                    (newer, Direction::Prev)
                }
            }
        }
    };

    let has_more = window.len() > limit;
    window.truncate(limit);
    if direction == Direction::Prev {
        window.reverse();
    }

    let cursor_for = |row: &T, direction: Direction| {
        let (created_at_ms, id) = key(row);
        Cursor { created_at_ms, id, direction }.encode()
    };

    let next_cursor = match direction {
        Direction::Next => {
            has_more.then(|| window.last().map(|r| cursor_for(r, Direction::Next))).flatten()
        }
        // Coming backward there are always rows after this page.
        Direction::Prev => window.last().map(|r| cursor_for(r, Direction::Next)),
    };
    let prev_cursor = match direction {
        Direction::Next => {
            // Only a cursor-bearing request has rows before this page.
            cursor
                .is_some()
                .then(|| window.first().map(|r| cursor_for(r, Direction::Prev)))
                .flatten()
        }
        Direction::Prev => {
            has_more.then(|| window.first().map(|r| cursor_for(r, Direction::Prev))).flatten()
        }
    };

    Ok(Page { items: window, next_cursor, prev_cursor })
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
