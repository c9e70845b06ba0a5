// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the orchestration core.
//!
//! Public operations document which of these kinds they produce; transports
//! map kinds to status codes without inspecting messages.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("optimistic lock failed: {0}")]
    OptimisticLockFailed(String),

    #[error("invalid query parameter: {0}")]
    InvalidQueryParameter(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("runner disabled: {0}")]
    RunnerDisabled(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Error::NotFound(what.to_string())
    }

    pub fn already_exists(what: impl std::fmt::Display) -> Self {
        Error::AlreadyExists(what.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::ValidationFailed(msg.into())
    }

    pub fn internal(msg: impl std::fmt::Display) -> Self {
        Error::Internal(msg.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    pub fn is_optimistic_lock_failed(&self) -> bool {
        matches!(self, Error::OptimisticLockFailed(_))
    }
}
