// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios over the public engine surface.

#[path = "specs/auth.rs"]
mod auth;
#[path = "specs/build.rs"]
mod build;
#[path = "specs/extend.rs"]
mod extend;
#[path = "specs/support.rs"]
mod support;
#[path = "specs/timeout.rs"]
mod timeout;
#[path = "specs/wire.rs"]
mod wire;
#[path = "specs/work_queue.rs"]
mod work_queue;
