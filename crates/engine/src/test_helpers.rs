// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the engine's unit tests.

use crate::{Engine, RunnerRegistration};
use derrick_core::{
    BuildOptions, Commit, EngineConfig, FakeClock, JobType, LegalEntity, Repo, Runner,
};
use derrick_store::Store;

pub(crate) struct Harness {
    pub engine: Engine<FakeClock>,
    pub clock: FakeClock,
    pub entity: LegalEntity,
    pub repo: Repo,
    pub commit: Commit,
    pub runner: Runner,
}

/// Engine over a fake clock with one legal entity, repo, commit and a
/// linux/amd64 runner.
pub(crate) fn harness() -> Harness {
    let clock = FakeClock::new();
    let engine = Engine::new(Store::new(), clock.clone(), EngineConfig::default());
    let entity = engine.create_legal_entity("acme").unwrap();
    let repo = engine.create_repo(entity.id, "app").unwrap();
    let commit = engine
        .create_commit(repo.id, "abc123", "json", definition(&[("compile", &[])]))
        .unwrap();
    let runner = engine
        .create_runner(RunnerRegistration {
            legal_entity_id: entity.id,
            name: "r1".to_string(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            labels: Default::default(),
            supported_job_types: [JobType::Docker, JobType::Exec].into_iter().collect(),
            client_certificate_der: None,
        })
        .unwrap();
    Harness { engine, clock, entity, repo, commit, runner }
}

/// A json definition of exec jobs on linux/amd64, each with one step.
/// `jobs` pairs a job name with its dependency names.
pub(crate) fn definition(jobs: &[(&str, &[&str])]) -> Vec<u8> {
    let jobs: Vec<serde_json::Value> = jobs
        .iter()
        .map(|(name, depends)| {
            serde_json::json!({
                "name": name,
                "runs_on": ["linux", "amd64"],
                "depends": depends,
                "steps": [{"name": "main", "commands": [format!("make {name}")]}],
            })
        })
        .collect();
    serde_json::to_vec(&serde_json::json!({ "jobs": jobs })).unwrap()
}

impl Harness {
    /// Enqueue a build of `jobs` against the fixture repo/commit.
    pub fn enqueue(&self, jobs: &[(&str, &[&str])]) -> derrick_core::BuildGraph {
        self.enqueue_with_options(jobs, BuildOptions::default())
    }

    pub fn enqueue_with_options(
        &self,
        jobs: &[(&str, &[&str])],
        options: BuildOptions,
    ) -> derrick_core::BuildGraph {
        self.engine
            .enqueue_build(crate::EnqueueRequest {
                repo_id: self.repo.id,
                commit_id: self.commit.id,
                ref_name: "refs/heads/main".to_string(),
                format: "json".to_string(),
                definition: definition(jobs),
                options,
            })
            .unwrap()
    }
}
