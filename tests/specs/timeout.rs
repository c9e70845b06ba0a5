// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-reaper scenarios.

use crate::support::world;
use derrick_core::{Etag, Status};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn sweep_fails_everything_unfinished_and_overdue() {
    let w = world();
    let graph = w.enqueue(&[("one", &[]), ("two", &[]), ("three", &[]), ("four", &[])]);
    let jobs = w.engine.store().read(|db| db.jobs_for_build(graph.build.id));
    let by_name = |name: &str| jobs.iter().find(|j| j.name == name).unwrap().id;

    // one finished; two left running; three left submitted; four queued.
    w.engine
        .update_job_status(by_name("one"), Status::Succeeded, None, &Etag::wildcard())
        .unwrap();
    w.engine
        .update_job_status(by_name("two"), Status::Running, None, &Etag::wildcard())
        .unwrap();
    w.engine
        .update_job_status(by_name("three"), Status::Submitted, None, &Etag::wildcard())
        .unwrap();

    let cancel = CancellationToken::new();
    let reaper = w.engine.spawn_reaper(cancel.clone());

    w.clock.advance(Duration::from_millis(2));
    let failed = reaper.check_for_timeouts(Duration::from_millis(1)).await.unwrap();
    assert_eq!(failed, 3);

    w.engine.store().read(|db| {
        let jobs = db.jobs_for_build(graph.build.id);
        for job in &jobs {
            if job.name == "one" {
                assert_eq!(job.status, Status::Succeeded);
                assert_eq!(job.error, None);
            } else {
                assert_eq!(job.status, Status::Failed);
                assert_eq!(job.error.as_deref(), Some("job timed out"));
            }
        }
        let build = db.read_build(graph.build.id).unwrap();
        assert_eq!(build.status, Status::Failed);
    });
    cancel.cancel();
}

#[tokio::test]
async fn jobs_within_the_timeout_are_untouched() {
    let w = world();
    let graph = w.enqueue(&[("one", &[])]);

    let cancel = CancellationToken::new();
    let reaper = w.engine.spawn_reaper(cancel.clone());

    w.clock.advance(Duration::from_millis(2));
    let failed = reaper.check_for_timeouts(Duration::from_secs(60)).await.unwrap();
    assert_eq!(failed, 0);
    assert_eq!(w.build_status(&graph), Status::Queued);
    cancel.cancel();
}
