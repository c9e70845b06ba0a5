// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::resource::MutableResource;

#[yare::parameterized(
    workflow_only = { "deploy", "deploy", None },
    workflow_and_job = { "deploy.publish", "deploy", Some("publish") },
    default_workflow_job = { ".compile", "", Some("compile") },
)]
fn node_ref_parse(input: &str, workflow: &str, job: Option<&str>) {
    let node = NodeRef::parse(input);
    assert_eq!(node.workflow, workflow);
    assert_eq!(node.job.as_deref(), job);
    assert_eq!(node.to_string(), input);
}

#[test]
fn options_trim_precondition() {
    let mut options = BuildOptions::default();
    assert!(!options.all_nodes_are_jobs());

    options.nodes_to_run = vec![NodeRef::job("", "a"), NodeRef::job("deploy", "b")];
    assert!(options.all_nodes_are_jobs());

    options.nodes_to_run.push(NodeRef::workflow("deploy"));
    assert!(!options.all_nodes_are_jobs());
}

#[test]
fn workflows_to_run_deduplicates() {
    let options = BuildOptions {
        force: false,
        nodes_to_run: vec![
            NodeRef::job("deploy", "a"),
            NodeRef::job("deploy", "b"),
            NodeRef::job("", "c"),
        ],
    };
    assert_eq!(options.workflows_to_run(), vec!["deploy".to_string(), String::new()]);
}

#[test]
fn etag_tracks_status() {
    let mut build = Build::new(RepoId::new(), CommitId::new(), "refs/heads/main");
    let before = build.content_etag();
    build.status = crate::status::Status::Running;
    let after = build.content_etag();
    assert_ne!(before, after);
}

#[test]
fn etag_ignores_soft_delete_marker() {
    let mut build = Build::new(RepoId::new(), CommitId::new(), "refs/heads/main");
    let before = build.content_etag();
    build.deleted_at_ms = Some(123);
    assert_eq!(before, build.content_etag());
}
