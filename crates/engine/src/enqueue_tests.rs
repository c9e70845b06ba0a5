// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::test_helpers::{definition, harness};
use crate::EnqueueRequest;
use derrick_core::{BuildOptions, Error, EventKind, NodeRef, Status};

#[test]
fn enqueue_persists_graph_with_logs_and_events() {
    let h = harness();
    let graph = h.enqueue(&[("compile", &[]), ("test", &["compile"])]);

    assert_eq!(graph.build.status, Status::Queued);
    assert_eq!(graph.build.build_number, 1);
    assert_eq!(graph.jobs.len(), 2);

    h.engine.store().read(|db| {
        let jobs = db.jobs_for_build(graph.build.id);
        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            assert_eq!(job.status, Status::Queued);
            assert!(!job.definition_data_hash.is_empty());
            // Job log chains under the build log.
            let log = db.read_log_descriptor(job.log_descriptor_id).unwrap();
            assert_eq!(log.parent_log_id, Some(graph.build.log_descriptor_id));
            // Ownership chains job under build.
            assert_eq!(db.owner_of(job.id.into()), Some(graph.build.id.into()));
        }
    });

    let events = h.engine.get_events(graph.build.id, 0, 100).unwrap();
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&EventKind::BuildStatusChanged));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::JobStatusChanged).count(),
        2
    );
}

#[test]
fn build_numbers_are_monotone_per_repo() {
    let h = harness();
    let first = h.enqueue(&[("a", &[])]);
    let second = h.enqueue(&[("a", &[])]);
    assert_eq!(first.build.build_number, 1);
    assert_eq!(second.build.build_number, 2);
}

#[test]
fn parse_failure_persists_a_failed_skeleton() {
    let h = harness();
    let graph = h
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: h.repo.id,
            commit_id: h.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: b"{not valid".to_vec(),
            options: BuildOptions::default(),
        })
        .unwrap();

    assert_eq!(graph.build.status, Status::Failed);
    assert!(graph.build.error.as_deref().unwrap_or("").contains("json"));
    assert!(graph.jobs.is_empty());
    assert!(graph.build.timings.finished_at_ms.is_some());
    assert!(graph.build.timings.queued_at_ms.is_some());

    // Exactly one persisted build, no jobs.
    h.engine.store().read(|db| {
        assert_eq!(db.jobs_for_build(graph.build.id).len(), 0);
    });
}

#[test]
fn validation_failure_becomes_a_failed_skeleton_too() {
    let h = harness();
    let graph = h
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: h.repo.id,
            commit_id: h.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: definition(&[("loop", &["loop"])]),
            options: BuildOptions::default(),
        })
        .unwrap();

    assert_eq!(graph.build.status, Status::Failed);
    assert!(graph.build.error.as_deref().unwrap_or("").contains("cycle"));
    assert!(graph.jobs.is_empty());

    h.engine.store().read(|db| {
        // Exactly one persisted build, carrying no jobs.
        let page = db
            .list_builds_for_repo(h.repo.id, &derrick_store::PageRequest::first(10))
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(db.jobs_for_build(graph.build.id).is_empty());
    });
}

#[test]
fn bad_nodes_to_run_surface_to_the_caller() {
    let h = harness();
    let err = h
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: h.repo.id,
            commit_id: h.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: definition(&[("compile", &[])]),
            options: BuildOptions {
                force: false,
                nodes_to_run: vec![NodeRef::job("", "no-such-job")],
            },
        })
        .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));
}

#[test]
fn unsatisfiable_labels_fail_the_job_at_enqueue() {
    let h = harness();
    let doc = serde_json::to_vec(&serde_json::json!({
        "jobs": [{
            "name": "gpu-job",
            "runs_on": ["supported", "not-supported"],
            "steps": [{"name": "main", "commands": ["true"]}],
        }]
    }))
    .unwrap();
    let graph = h
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: h.repo.id,
            commit_id: h.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: doc,
            options: BuildOptions::default(),
        })
        .unwrap();

    let job = h.engine.store().read(|db| db.jobs_for_build(graph.build.id)[0].clone());
    assert_eq!(job.status, Status::Failed);
    assert_eq!(job.error.as_deref(), Some(super::NO_CAPABLE_RUNNER));

    // All jobs unrunnable: the build rolled up to failed immediately.
    let build = h.engine.store().read(|db| db.read_build(graph.build.id)).unwrap();
    assert_eq!(build.status, Status::Failed);
    assert_eq!(build.error.as_deref(), Some("1 job(s) failed"));
}

#[test]
fn mixed_runnable_and_unrunnable_build_is_running() {
    let h = harness();
    let doc = serde_json::to_vec(&serde_json::json!({
        "jobs": [
            {"name": "ok", "runs_on": ["linux", "amd64"],
             "steps": [{"name": "main", "commands": ["true"]}]},
            {"name": "stuck", "runs_on": ["macos"],
             "steps": [{"name": "main", "commands": ["true"]}]},
        ]
    }))
    .unwrap();
    let graph = h
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: h.repo.id,
            commit_id: h.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: doc,
            options: BuildOptions::default(),
        })
        .unwrap();

    let build = h.engine.store().read(|db| db.read_build(graph.build.id)).unwrap();
    assert_eq!(build.status, Status::Running);

    let jobs = h.engine.store().read(|db| db.jobs_for_build(graph.build.id));
    let ok = jobs.iter().find(|j| j.name == "ok").unwrap();
    let stuck = jobs.iter().find(|j| j.name == "stuck").unwrap();
    assert_eq!(ok.status, Status::Queued);
    assert_eq!(stuck.status, Status::Failed);
}

#[test]
fn trim_restricts_to_requested_jobs_and_dependencies() {
    let h = harness();
    let options = BuildOptions {
        force: false,
        nodes_to_run: vec![NodeRef::job("", "test")],
    };
    let graph = h.enqueue_with_options(
        &[("compile", &[]), ("test", &["compile"]), ("package", &["test"])],
        options,
    );

    let names: Vec<_> = graph.jobs.iter().map(|jg| jg.job.name.clone()).collect();
    assert_eq!(names, vec!["compile".to_string(), "test".to_string()]);
}

#[test]
fn workflow_only_nodes_do_not_trim() {
    let h = harness();
    let options = BuildOptions {
        force: false,
        nodes_to_run: vec![NodeRef::workflow("")],
    };
    let graph = h.enqueue_with_options(&[("compile", &[]), ("package", &[])], options);
    assert_eq!(graph.jobs.len(), 2);
}
