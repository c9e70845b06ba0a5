// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! derrick-definition: build-definition parsing for Derrick
//!
//! Parses format-tagged definition documents into the structural
//! [`BuildDefinition`] model and materialises them as build graphs.

mod error;
mod formats;
mod model;
mod parser;

pub use error::ParseError;
pub use formats::{JsonParser, TomlParser};
pub use model::{
    ArtifactEntry, BuildDefinition, DependsEntry, JobDefinition, ServiceEntry, StepDefinition,
};
pub use parser::{DefinitionParser, ParserRegistry};
