// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parse-stage errors.
//!
//! Everything here surfaces to callers as `ValidationFailed`; the enqueue
//! path additionally captures these into persisted failed builds instead of
//! returning them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no parser registered for format '{0}'")]
    UnknownFormat(String),

    #[error("invalid {format} document: {message}")]
    Syntax { format: String, message: String },

    #[error("build definition is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("definition has {count} jobs, limit is {limit}")]
    TooManyJobs { count: usize, limit: usize },

    #[error("job '{job}' has {count} steps, limit is {limit}")]
    TooManySteps { job: String, count: usize, limit: usize },

    #[error("{0}")]
    Invalid(String),
}

impl From<ParseError> for derrick_core::Error {
    fn from(err: ParseError) -> Self {
        derrick_core::Error::ValidationFailed(err.to_string())
    }
}
