// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in definition formats.

use crate::error::ParseError;
use crate::model::BuildDefinition;
use crate::parser::DefinitionParser;

pub struct JsonParser;

impl DefinitionParser for JsonParser {
    fn format(&self) -> &'static str {
        "json"
    }

    fn parse(&self, bytes: &[u8]) -> Result<BuildDefinition, ParseError> {
        serde_json::from_slice(bytes).map_err(|e| ParseError::Syntax {
            format: "json".to_string(),
            message: e.to_string(),
        })
    }
}

pub struct TomlParser;

impl DefinitionParser for TomlParser {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn parse(&self, bytes: &[u8]) -> Result<BuildDefinition, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Syntax {
            format: "toml".to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(text).map_err(|e| ParseError::Syntax {
            format: "toml".to_string(),
            message: e.to_string(),
        })
    }
}
