// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build lifecycle scenarios: happy path, partial failure, boundaries.

use crate::support::{definition, world, world_with_config};
use derrick_core::{BuildOptions, EngineConfig, Etag, EventKind, Status};
use derrick_engine::EnqueueRequest;

#[test]
fn four_job_build_succeeds_with_ordered_events() {
    let w = world();
    let graph = w.enqueue(&[
        ("one", &[]),
        ("two", &["one"]),
        ("three", &["two"]),
        ("four", &["three"]),
    ]);
    assert_eq!(w.build_status(&graph), Status::Queued);

    for expected in ["one", "two", "three", "four"] {
        let job = w.run_next_job(Status::Succeeded);
        assert_eq!(job.name, expected);
    }
    assert_eq!(w.build_status(&graph), Status::Succeeded);

    let events = w.engine.get_events(graph.build.id, 0, 1000).unwrap();

    // Sequence numbers strictly increase.
    for pair in events.windows(2) {
        assert!(pair[1].sequence > pair[0].sequence);
    }

    // The build walked queued → running → succeeded, announcing each.
    let build_payloads: Vec<&str> = events
        .iter()
        .filter(|e| e.kind == EventKind::BuildStatusChanged)
        .map(|e| e.payload.as_str())
        .collect();
    assert_eq!(build_payloads, vec!["queued", "running", "succeeded"]);

    // Every job announced success exactly once.
    let succeeded_jobs = events
        .iter()
        .filter(|e| e.kind == EventKind::JobStatusChanged && e.payload == "succeeded")
        .count();
    assert_eq!(succeeded_jobs, 4);
}

#[test]
fn two_failed_jobs_fail_the_build_after_the_last_report() {
    let w = world();
    let graph = w.enqueue(&[("one", &[]), ("two", &[]), ("three", &[]), ("four", &[])]);
    let jobs = w.engine.store().read(|db| db.jobs_for_build(graph.build.id));
    let by_name = |name: &str| jobs.iter().find(|j| j.name == name).unwrap().id;

    let report = |name: &str, status: Status| {
        w.engine
            .update_job_status(by_name(name), status, None, &Etag::wildcard())
            .unwrap();
    };
    report("one", Status::Succeeded);
    report("two", Status::Failed);
    report("three", Status::Failed);
    assert_eq!(w.build_status(&graph), Status::Running);

    report("four", Status::Succeeded);
    let build = w.engine.store().read(|db| db.read_build(graph.build.id)).unwrap();
    assert_eq!(build.status, Status::Failed);
    assert_eq!(build.error.as_deref(), Some("2 job(s) failed"));
}

#[test]
fn definition_at_the_size_limit_builds_and_one_byte_over_fails() {
    let mut config = EngineConfig::default();
    let body = definition(&[("compile", &[])]);
    config.limits.max_build_config_length = body.len() + 1;
    let w = world_with_config(config);

    // Pad to exactly the limit with whitespace json tolerates.
    let mut at_limit = body.clone();
    at_limit.push(b' ');
    let graph = w
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: w.repo.id,
            commit_id: w.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: at_limit.clone(),
            options: BuildOptions::default(),
        })
        .unwrap();
    assert_eq!(graph.build.status, Status::Queued);

    let mut over = at_limit;
    over.push(b' ');
    let skeleton = w
        .engine
        .enqueue_build(EnqueueRequest {
            repo_id: w.repo.id,
            commit_id: w.commit.id,
            ref_name: "refs/heads/main".to_string(),
            format: "json".to_string(),
            definition: over,
            options: BuildOptions::default(),
        })
        .unwrap();
    assert_eq!(skeleton.build.status, Status::Failed);
    assert!(skeleton.jobs.is_empty());
}

#[test]
fn indirection_elides_repeat_work_across_builds() {
    let w = world();

    let first = w.enqueue(&[("compile", &[])]);
    let runnable = w.engine.dequeue(w.runner.id).unwrap();
    w.engine
        .record_fingerprint(runnable.job.id, "inputs-v1", "sha256", &Etag::wildcard())
        .unwrap();
    w.engine
        .update_job_status(runnable.job.id, Status::Succeeded, None, &Etag::wildcard())
        .unwrap();
    assert_eq!(w.build_status(&first), Status::Succeeded);

    // A later build of the same job computes the same fingerprint.
    let second = w.enqueue(&[("compile", &[])]);
    let repeat = w.engine.dequeue(w.runner.id).unwrap();
    let indirected = w
        .engine
        .record_fingerprint(repeat.job.id, "inputs-v1", "sha256", &Etag::wildcard())
        .unwrap();
    assert_eq!(indirected.indirect_to_job_id, Some(runnable.job.id));

    // The runner observes the indirection and reports success without
    // executing anything.
    w.engine
        .update_job_status(repeat.job.id, Status::Succeeded, None, &Etag::wildcard())
        .unwrap();
    assert_eq!(w.build_status(&second), Status::Succeeded);
}

#[test]
fn builds_list_newest_first_with_cursors() {
    let w = world();
    let mut ids = Vec::new();
    for _ in 0..5 {
        w.clock.advance(std::time::Duration::from_millis(1));
        ids.push(w.enqueue(&[("a", &[])]).build.id);
    }

    let first_page = w
        .engine
        .store()
        .read(|db| db.list_builds_for_repo(w.repo.id, &derrick_store::PageRequest::first(2)))
        .unwrap();
    assert_eq!(first_page.items.len(), 2);
    assert_eq!(first_page.items[0].id, ids[4]);
    assert_eq!(first_page.items[1].id, ids[3]);

    let second_page = w
        .engine
        .store()
        .read(|db| {
            db.list_builds_for_repo(
                w.repo.id,
                &derrick_store::PageRequest::after(first_page.next_cursor.clone().unwrap(), 2),
            )
        })
        .unwrap();
    assert_eq!(second_page.items[0].id, ids[2]);
}
