// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The structural model every definition format parses into, and its
//! conversion to a build graph.

use crate::error::ParseError;
use derrick_core::{
    ArtifactDefinition, Build, BuildGraph, Job, JobDependency, JobGraph, JobType,
    ServiceDefinition, Step, StepDependency, StepExecution,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed build definition, independent of the source format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDefinition {
    #[serde(default)]
    pub jobs: Vec<JobDefinition>,
}

/// One dependency entry: either a compact string or a detailed object.
///
/// String grammar: `job` (same workflow as the declaring job), `.job`
/// (default workflow), `workflow.job`, or `workflow.*` (every job of that
/// workflow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsEntry {
    Name(String),
    Detailed {
        #[serde(default)]
        workflow: Option<String>,
        job: String,
        #[serde(default)]
        artifacts: Vec<String>,
    },
}

impl DependsEntry {
    /// Resolve to an explicit dependency. `own_workflow` is the workflow of
    /// the declaring job, used when the entry names no workflow.
    fn resolve(&self, own_workflow: &str) -> JobDependency {
        match self {
            DependsEntry::Name(s) => match s.split_once('.') {
                Some((workflow, job)) => JobDependency::new(workflow, job),
                None => JobDependency::new(own_workflow, s.as_str()),
            },
            DependsEntry::Detailed { workflow, job, artifacts } => {
                let workflow = workflow.as_deref().unwrap_or(own_workflow);
                let mut dep = JobDependency::new(workflow, job.as_str());
                dep.artifact_dependencies = artifacts.clone();
                dep
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    #[serde(default)]
    pub workflow: String,
    pub name: String,
    #[serde(rename = "type", default = "default_job_type")]
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub runs_on: Vec<String>,
    #[serde(default)]
    pub depends: Vec<DependsEntry>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    #[serde(default)]
    pub environment: IndexMap<String, String>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactEntry>,
    /// Commands whose output feeds the job fingerprint.
    #[serde(default)]
    pub fingerprint: Vec<String>,
    #[serde(default)]
    pub step_execution: StepExecution,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

fn default_job_type() -> String {
    "exec".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub environment: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub group: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub depends: Vec<String>,
}

impl BuildDefinition {
    /// Materialise the definition as job graphs attached to `build`.
    ///
    /// Structural validation (cycles, dangling references, duplicates) is
    /// the graph's own job; this only shapes the data.
    pub fn into_graph(self, build: Build) -> Result<BuildGraph, ParseError> {
        let mut graph = BuildGraph::new(build);
        for job_def in self.jobs {
            graph.push_job(job_def.into_job_graph()?);
        }
        Ok(graph)
    }
}

impl JobDefinition {
    fn into_job_graph(self) -> Result<JobGraph, ParseError> {
        if self.name.is_empty() {
            return Err(ParseError::Invalid("job with empty name".to_string()));
        }
        let mut job = Job::new(self.workflow.clone(), self.name, JobType::parse(&self.job_type));
        job.docker_image = self.image;
        job.runs_on = self.runs_on.into_iter().collect();
        job.depends = self.depends.iter().map(|d| d.resolve(&self.workflow)).collect();
        job.services = self
            .services
            .into_iter()
            .map(|s| ServiceDefinition {
                name: s.name,
                image: s.image,
                environment: s.environment.into_iter().collect(),
            })
            .collect();
        job.environment = self.environment.into_iter().collect();
        job.artifact_definitions = self
            .artifacts
            .into_iter()
            .map(|a| ArtifactDefinition { group_name: a.group, paths: a.paths })
            .collect();
        job.fingerprint_commands = self.fingerprint;
        job.step_execution = self.step_execution;

        let steps = self
            .steps
            .into_iter()
            .map(|s| {
                let mut step = Step::new(s.name, s.commands);
                step.depends = s.depends.into_iter().map(StepDependency::new).collect();
                step
            })
            .collect();

        Ok(JobGraph::new(job, steps))
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
