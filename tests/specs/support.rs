// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scenario fixtures.

use derrick_core::{
    BuildGraph, BuildOptions, Commit, EngineConfig, Etag, FakeClock, JobType, LegalEntity, Repo,
    Runner, Status,
};
use derrick_engine::{Engine, EnqueueRequest, RunnerRegistration};
use derrick_store::Store;

pub struct World {
    pub engine: Engine<FakeClock>,
    pub clock: FakeClock,
    pub entity: LegalEntity,
    pub repo: Repo,
    pub commit: Commit,
    pub runner: Runner,
}

/// One legal entity with a repo, a commit and a linux/amd64 runner.
pub fn world() -> World {
    world_with_config(EngineConfig::default())
}

pub fn world_with_config(config: EngineConfig) -> World {
    let clock = FakeClock::new();
    let engine = Engine::new(Store::new(), clock.clone(), config);
    let entity = engine.create_legal_entity("acme").unwrap();
    let repo = engine.create_repo(entity.id, "app").unwrap();
    let commit = engine
        .create_commit(repo.id, "abc123", "json", definition(&[("seed", &[])]))
        .unwrap();
    let runner = engine
        .create_runner(RunnerRegistration {
            legal_entity_id: entity.id,
            name: "runner-1".to_string(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            labels: Default::default(),
            supported_job_types: [JobType::Docker, JobType::Exec].into_iter().collect(),
            client_certificate_der: None,
        })
        .unwrap();
    World { engine, clock, entity, repo, commit, runner }
}

/// A json definition of linux/amd64 exec jobs, each with one step.
pub fn definition(jobs: &[(&str, &[&str])]) -> Vec<u8> {
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

impl World {
    pub fn enqueue(&self, jobs: &[(&str, &[&str])]) -> BuildGraph {
        self.engine
            .enqueue_build(EnqueueRequest {
                repo_id: self.repo.id,
                commit_id: self.commit.id,
                ref_name: "refs/heads/main".to_string(),
                format: "json".to_string(),
                definition: definition(jobs),
                options: BuildOptions::default(),
            })
            .unwrap()
    }

    /// Dequeue one job and report it finished with `status`.
    pub fn run_next_job(&self, status: Status) -> derrick_core::Job {
        let runnable = self.engine.dequeue(self.runner.id).unwrap();
        for step in &runnable.steps {
            self.engine
                .update_step_status(step.id, status, None, &Etag::wildcard())
                .unwrap();
        }
        self.engine
            .update_job_status(runnable.job.id, status, None, &Etag::wildcard())
            .unwrap()
    }

    pub fn build_status(&self, build: &BuildGraph) -> Status {
        self.engine
            .store()
            .read(|db| db.read_build(build.build.id))
            .unwrap()
            .status
    }
}
