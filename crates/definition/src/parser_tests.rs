// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ParseError;

fn one_job_json(name: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({"jobs": [{"name": name}]})).unwrap()
}

#[test]
fn json_document_parses() {
    let registry = ParserRegistry::with_defaults();
    let definition = registry
        .parse("json", &one_job_json("compile"), &Limits::default())
        .unwrap();
    assert_eq!(definition.jobs.len(), 1);
    assert_eq!(definition.jobs[0].name, "compile");
}

#[test]
fn toml_document_parses() {
    let registry = ParserRegistry::with_defaults();
    let doc = br#"
[[jobs]]
name = "compile"
runs_on = ["linux"]

[[jobs.steps]]
name = "build"
commands = ["cargo build"]
"#;
    let definition = registry.parse("toml", doc, &Limits::default()).unwrap();
    assert_eq!(definition.jobs[0].steps[0].commands, vec!["cargo build".to_string()]);
}

#[test]
fn unknown_format_rejected() {
    let registry = ParserRegistry::with_defaults();
    let err = registry
        .parse("yaml", b"jobs: []", &Limits::default())
        .unwrap_err();
    assert!(matches!(err, ParseError::UnknownFormat(f) if f == "yaml"));
}

#[test]
fn syntax_errors_name_the_format() {
    let registry = ParserRegistry::with_defaults();
    let err = registry.parse("json", b"{nope", &Limits::default()).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { format, .. } if format == "json"));
}

#[test]
fn document_at_the_length_limit_parses() {
    let registry = ParserRegistry::with_defaults();
    let mut doc = one_job_json("compile");
    // Pad with trailing whitespace, which json tolerates.
    let limit = 1024;
    doc.resize(limit, b' ');
    let limits = Limits { max_build_config_length: limit, ..Limits::default() };
    registry.parse("json", &doc, &limits).unwrap();
}

#[test]
fn document_one_byte_over_the_limit_fails() {
    let registry = ParserRegistry::with_defaults();
    let mut doc = one_job_json("compile");
    let limit = 1024;
    doc.resize(limit + 1, b' ');
    let limits = Limits { max_build_config_length: limit, ..Limits::default() };
    let err = registry.parse("json", &doc, &limits).unwrap_err();
    assert!(matches!(err, ParseError::DocumentTooLarge { size, limit } if size == 1025 && limit == 1024));
}

#[test]
fn job_count_limit_enforced() {
    let registry = ParserRegistry::with_defaults();
    let doc = serde_json::to_vec(&serde_json::json!({
        "jobs": [{"name": "a"}, {"name": "b"}, {"name": "c"}]
    }))
    .unwrap();
    let limits = Limits { max_jobs_per_build: 2, ..Limits::default() };
    let err = registry.parse("json", &doc, &limits).unwrap_err();
    assert!(matches!(err, ParseError::TooManyJobs { count: 3, limit: 2 }));
}

#[test]
fn step_count_limit_enforced() {
    let registry = ParserRegistry::with_defaults();
    let doc = serde_json::to_vec(&serde_json::json!({
        "jobs": [{"name": "a", "steps": [{"name": "s1"}, {"name": "s2"}]}]
    }))
    .unwrap();
    let limits = Limits { max_steps_per_job: 1, ..Limits::default() };
    let err = registry.parse("json", &doc, &limits).unwrap_err();
    assert!(matches!(err, ParseError::TooManySteps { limit: 1, .. }));
}

#[test]
fn custom_parsers_can_register() {
    struct NullParser;
    impl DefinitionParser for NullParser {
        fn format(&self) -> &'static str {
            "null"
        }
        fn parse(&self, _bytes: &[u8]) -> Result<BuildDefinition, ParseError> {
            Ok(BuildDefinition::default())
        }
    }

    let mut registry = ParserRegistry::new();
    registry.register(std::sync::Arc::new(NullParser));
    assert_eq!(registry.formats(), vec!["null"]);
    registry.parse("null", b"", &Limits::default()).unwrap();
}
