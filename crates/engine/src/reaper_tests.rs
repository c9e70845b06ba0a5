// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::test_helpers::harness;
use derrick_core::{Etag, Status};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn sweep_fails_only_overdue_unfinished_jobs() {
    let h = harness();
    let graph = h.enqueue(&[("a", &[]), ("b", &[]), ("c", &[]), ("d", &[])]);
    let jobs = h.engine.store().read(|db| db.jobs_for_build(graph.build.id));

    // a finished, b running, c submitted, d still queued.
    h.engine
        .update_job_status(jobs[0].id, Status::Succeeded, None, &Etag::wildcard())
        .unwrap();
    h.engine
        .update_job_status(jobs[1].id, Status::Running, None, &Etag::wildcard())
        .unwrap();
    h.engine
        .update_job_status(jobs[2].id, Status::Submitted, None, &Etag::wildcard())
        .unwrap();

    let cancel = CancellationToken::new();
    let reaper = h.engine.spawn_reaper(cancel.clone());

    h.clock.advance(Duration::from_millis(2));
    let failed = reaper.check_for_timeouts(Duration::from_millis(1)).await.unwrap();
    assert_eq!(failed, 3);

    h.engine.store().read(|db| {
        let jobs = db.jobs_for_build(graph.build.id);
        assert_eq!(jobs[0].status, Status::Succeeded);
        for job in &jobs[1..] {
            assert_eq!(job.status, Status::Failed);
            assert_eq!(job.error.as_deref(), Some("job timed out"));
            for step in db.steps_for_job(job.id) {
                assert_eq!(step.status, Status::Failed);
            }
        }
        let build = db.read_build(graph.build.id).unwrap();
        assert_eq!(build.status, Status::Failed);
        assert_eq!(build.error.as_deref(), Some("3 job(s) failed"));
    });

    cancel.cancel();
}

#[tokio::test]
async fn fresh_jobs_survive_the_sweep() {
    let h = harness();
    let graph = h.enqueue(&[("a", &[])]);

    let cancel = CancellationToken::new();
    let reaper = h.engine.spawn_reaper(cancel.clone());

    let failed = reaper.check_for_timeouts(Duration::from_secs(3600)).await.unwrap();
    assert_eq!(failed, 0);

    let build = h.engine.store().read(|db| db.read_build(graph.build.id)).unwrap();
    assert_eq!(build.status, Status::Queued);
    cancel.cancel();
}

#[tokio::test]
async fn repeated_sweeps_are_idempotent() {
    let h = harness();
    h.enqueue(&[("a", &[])]);

    let cancel = CancellationToken::new();
    let reaper = h.engine.spawn_reaper(cancel.clone());

    h.clock.advance(Duration::from_millis(5));
    let first = reaper.check_for_timeouts(Duration::from_millis(1)).await.unwrap();
    let second = reaper.check_for_timeouts(Duration::from_millis(1)).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 0);
    cancel.cancel();
}
