// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Format-pluggable definition parsing, bounded by size and count limits.

use crate::error::ParseError;
use crate::formats::{JsonParser, TomlParser};
use crate::model::BuildDefinition;
use derrick_core::Limits;
use std::collections::HashMap;
use std::sync::Arc;

/// A parser for one definition format, registered by content tag.
pub trait DefinitionParser: Send + Sync {
    /// Content tag this parser handles ("json", "toml", ...).
    fn format(&self) -> &'static str;

    fn parse(&self, bytes: &[u8]) -> Result<BuildDefinition, ParseError>;
}

/// Registry of definition parsers, keyed by content tag.
pub struct ParserRegistry {
    parsers: HashMap<&'static str, Arc<dyn DefinitionParser>>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { parsers: HashMap::new() }
    }

    /// A registry with the built-in formats registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonParser));
        registry.register(Arc::new(TomlParser));
        registry
    }

    pub fn register(&mut self, parser: Arc<dyn DefinitionParser>) {
        self.parsers.insert(parser.format(), parser);
    }

    pub fn formats(&self) -> Vec<&'static str> {
        let mut formats: Vec<_> = self.parsers.keys().copied().collect();
        formats.sort_unstable();
        formats
    }

    /// Parse a format-tagged document, enforcing the configured limits.
    ///
    /// Produces `UnknownFormat`, `Syntax`, `DocumentTooLarge`, `TooManyJobs`
    /// or `TooManySteps`.
    pub fn parse(
        &self,
        format: &str,
        bytes: &[u8],
        limits: &Limits,
    ) -> Result<BuildDefinition, ParseError> {
        if bytes.len() > limits.max_build_config_length {
            return Err(ParseError::DocumentTooLarge {
                size: bytes.len(),
                limit: limits.max_build_config_length,
            });
        }

        let parser = self
            .parsers
            .get(format)
            .ok_or_else(|| ParseError::UnknownFormat(format.to_string()))?;
        let definition = parser.parse(bytes)?;

        if definition.jobs.len() > limits.max_jobs_per_build {
            return Err(ParseError::TooManyJobs {
                count: definition.jobs.len(),
                limit: limits.max_jobs_per_build,
            });
        }
        for job in &definition.jobs {
            if job.steps.len() > limits.max_steps_per_job {
                return Err(ParseError::TooManySteps {
                    job: job.name.clone(),
                    count: job.steps.len(),
                    limit: limits.max_steps_per_job,
                });
            }
        }

        Ok(definition)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
