// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner-protocol scenarios: the wire shapes against a live engine.

use crate::support::world;
use derrick_core::{MutableResource, Status};
use derrick_wire::{EventsPage, JobPatch, JobPatchBody, RunnableJobResponse};

#[test]
fn dequeued_jobs_travel_as_runnable_job_responses() {
    let w = world();
    w.enqueue(&[("compile", &[])]);
    let runnable = w.engine.dequeue(w.runner.id).unwrap();

    let response = RunnableJobResponse {
        job: runnable.job.clone(),
        steps: runnable.steps.clone(),
        repo: runnable.repo.clone(),
        commit: runnable.commit.clone(),
        dependency_jobs: runnable.dependency_jobs.clone(),
        dependency_artifacts: runnable.dependency_artifacts.clone(),
        jwt: runnable.jwt.clone(),
        workflows_to_run: runnable.workflows_to_run.clone(),
        log_descriptor_id: runnable.log_descriptor_id,
    };

    let json = serde_json::to_string(&response).unwrap();
    let parsed: RunnableJobResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.job.id, runnable.job.id);
    assert_eq!(parsed.steps.len(), 1);
    assert_eq!(parsed.jwt, runnable.jwt);
}

#[test]
fn a_status_patch_drives_the_job_to_completion() {
    let w = world();
    let graph = w.enqueue(&[("compile", &[])]);
    let runnable = w.engine.dequeue(w.runner.id).unwrap();

    // The body a runner would PATCH back, classified then applied.
    let body: JobPatchBody = serde_json::from_value(serde_json::json!({
        "status": "succeeded",
        "etag": runnable.job.etag().as_str(),
    }))
    .unwrap();
    let JobPatch::Status { status, error, etag } = body.classify().unwrap() else {
        panic!("expected the status form");
    };

    w.engine
        .update_job_status(
            runnable.job.id,
            status,
            error,
            &derrick_core::Etag::from_string(etag),
        )
        .unwrap();
    assert_eq!(w.build_status(&graph), Status::Succeeded);
}

#[test]
fn event_pages_page_the_feed_for_long_polling() {
    let w = world();
    let graph = w.enqueue(&[("compile", &[])]);

    let mut last = 0;
    let page = EventsPage {
        events: w.engine.get_events(graph.build.id, last, 2).unwrap(),
    };
    assert!(!page.events.is_empty());
    last = page.next_last(last);

    w.run_next_job(Status::Succeeded);
    let next = EventsPage {
        events: w.engine.get_events(graph.build.id, last, 100).unwrap(),
    };
    assert!(next.events.iter().all(|e| e.sequence > last));
    assert!(next
        .events
        .iter()
        .any(|e| e.kind == derrick_core::EventKind::BuildStatusChanged && e.payload == "succeeded"));
}
