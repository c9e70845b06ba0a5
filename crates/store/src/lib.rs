// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! derrick-store: transactional store façade for Derrick
//!
//! A uniform CRUD surface with optimistic concurrency, soft-delete, cursor
//! pagination and an authorisation engine, over an in-memory engine that
//! serialises write transactions process-wide. The query surface is
//! engine-independent; a row-locking SQL engine slots in behind the same
//! shapes.

mod authz;
mod builds;
mod cursor;
mod db;
mod events;
mod jobs;
mod logs;
mod principals;
mod repos;
mod runners;
mod table;
mod txn;
mod work;

pub use cursor::{paginate, Cursor, Direction, Page, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use db::Database;
pub use table::{Table, UPSERT_RETRY_BOUND};
pub use txn::Store;
