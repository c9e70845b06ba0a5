// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by this crate's tests and, via the `test-support`
//! feature, by other crates' tests.

use crate::build::Build;
use crate::graph::{BuildGraph, JobGraph};
use crate::job::{Job, JobDependency, JobType};
use crate::repo::{CommitId, RepoId};
use crate::step::Step;

/// A job named `name` in the default workflow running on linux/amd64.
pub fn linux_job(name: &str) -> Job {
    let mut job = Job::new("", name, JobType::Exec);
    job.runs_on = ["linux", "amd64"].into_iter().map(String::from).collect();
    job
}

/// `linux_job` with dependencies on the named default-workflow jobs.
pub fn linux_job_depending_on(name: &str, deps: &[&str]) -> Job {
    let mut job = linux_job(name);
    job.depends = deps.iter().map(|d| JobDependency::new("", *d)).collect();
    job
}

/// A one-step job graph wrapping `job`.
pub fn job_graph(job: Job) -> JobGraph {
    let step = Step::new("main", vec![format!("echo {}", job.name)]);
    JobGraph::new(job, vec![step])
}

/// A build graph over fresh repo/commit ids containing the given jobs.
pub fn build_graph(jobs: Vec<Job>) -> BuildGraph {
    let build = Build::new(RepoId::new(), CommitId::new(), "refs/heads/main");
    let mut graph = BuildGraph::new(build);
    for job in jobs {
        graph.push_job(job_graph(job));
    }
    graph
}
