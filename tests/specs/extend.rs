// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic build-extension scenarios.

use crate::support::{definition, world};
use derrick_core::{Error, Status};

#[test]
fn mid_flight_extension_runs_the_new_job() {
    let w = world();
    let graph = w.enqueue(&[("job_a", &[])]);

    // job_a is in flight when job_b arrives.
    let runnable = w.engine.dequeue(w.runner.id).unwrap();
    assert_eq!(runnable.job.name, "job_a");

    let (merged, added) = w
        .engine
        .add_config_to_build(graph.build.id, &definition(&[("job_b", &["job_a"])]), "json")
        .unwrap();
    assert_eq!(merged.jobs.len(), 2);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].job.name, "job_b");

    w.engine
        .update_job_status(
            runnable.job.id,
            Status::Succeeded,
            None,
            &derrick_core::Etag::wildcard(),
        )
        .unwrap();

    let job = w.run_next_job(Status::Succeeded);
    assert_eq!(job.name, "job_b");
    assert_eq!(w.build_status(&graph), Status::Succeeded);
}

#[test]
fn self_dependent_extension_is_rejected_and_build_unchanged() {
    let w = world();
    let graph = w.enqueue(&[("job_a", &[])]);

    let err = w
        .engine
        .add_config_to_build(graph.build.id, &definition(&[("job_c", &["job_c"])]), "json")
        .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));

    w.engine.store().read(|db| {
        let jobs = db.jobs_for_build(graph.build.id);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "job_a");
        assert_eq!(jobs[0].status, Status::Queued);
    });
    assert_eq!(w.build_status(&graph), Status::Queued);
}
