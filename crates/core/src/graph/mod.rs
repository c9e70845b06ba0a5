// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build graph: a typed DAG of builds → jobs → steps.
//!
//! A [`BuildGraph`] owns an ordered sequence of [`JobGraph`]s; each job graph
//! owns its steps. Job dependencies may cross workflows and may use the
//! wildcard job name `"*"`; step dependencies are local to their job.

mod validate;

use crate::build::{Build, BuildId, NodeRef};
use crate::error::{Error, Result};
use crate::etag::sha256_hex;
use crate::job::{
    ArtifactDefinition, Job, JobDependency, JobId, JobType, ServiceDefinition, StepExecution,
};
use crate::status::Status;
use crate::step::{Step, StepId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One job plus its steps.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobGraph {
    pub job: Job,
    pub steps: Vec<Step>,
}

impl JobGraph {
    pub fn new(job: Job, steps: Vec<Step>) -> Self {
        Self { job, steps }
    }
}

/// A build plus every job graph it contains.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BuildGraph {
    pub build: Build,
    pub jobs: Vec<JobGraph>,
}

#[derive(Clone, Copy, PartialEq)]
enum Colour {
    White,
    Grey,
    Black,
}

impl BuildGraph {
    pub fn new(build: Build) -> Self {
        Self { build, jobs: Vec::new() }
    }

    pub fn push_job(&mut self, job_graph: JobGraph) {
        self.jobs.push(job_graph);
    }

    pub fn find_job(&self, workflow: &str, name: &str) -> Option<&JobGraph> {
        self.jobs
            .iter()
            .find(|jg| jg.job.workflow == workflow && jg.job.name == name)
    }

    pub fn has_workflow(&self, workflow: &str) -> bool {
        self.jobs.iter().any(|jg| jg.job.workflow == workflow)
    }

    /// Indices of jobs a dependency of `from` resolves to.
    ///
    /// A wildcard matches every job of the target workflow except `from`
    /// itself; an exact name may match `from` (a self-cycle the validator
    /// reports).
    fn resolve_dependency(&self, from: usize, dep: &JobDependency) -> Vec<usize> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(i, jg)| {
                dep.matches(&jg.job.workflow, &jg.job.name) && !(dep.is_wildcard() && *i == from)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of every job the job at `from` depends on.
    pub(crate) fn dependency_indices(&self, from: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for dep in &self.jobs[from].job.depends {
            for i in self.resolve_dependency(from, dep) {
                if !out.contains(&i) {
                    out.push(i);
                }
            }
        }
        out
    }

    /// Fill in defaults: assign missing ids, propagate build-level refs down
    /// to jobs and steps, stamp creation and queue timestamps, and compute
    /// each job's definition-data hash.
    pub fn populate_defaults(&mut self, now_ms: u64) {
        if self.build.id.is_empty() {
            self.build.id = BuildId::new();
        }
        if self.build.created_at_ms == 0 {
            self.build.created_at_ms = now_ms;
        }
        self.build.timings.stamp(Status::Queued, now_ms);

        for jg in &mut self.jobs {
            if jg.job.id.is_empty() {
                jg.job.id = JobId::new();
            }
            jg.job.build_id = self.build.id;
            jg.job.repo_id = self.build.repo_id;
            jg.job.commit_id = self.build.commit_id;
            if jg.job.created_at_ms == 0 {
                jg.job.created_at_ms = now_ms;
            }
            jg.job.timings.stamp(Status::Queued, now_ms);

            for step in &mut jg.steps {
                if step.id.is_empty() {
                    step.id = StepId::new();
                }
                step.job_id = jg.job.id;
                step.build_id = self.build.id;
                if step.created_at_ms == 0 {
                    step.created_at_ms = now_ms;
                }
                step.timings.stamp(Status::Queued, now_ms);
            }

            let hash = definition_hash(&jg.job, &jg.steps);
            jg.job.definition_data_hash = hash;
        }
    }

    /// Job indices in topological order, dependencies first.
    ///
    /// Fails with `ValidationFailed` when the dependency graph is cyclic.
    pub(crate) fn topo_order(&self) -> Result<Vec<usize>> {
        let mut colours = vec![Colour::White; self.jobs.len()];
        let mut order = Vec::with_capacity(self.jobs.len());
        for i in 0..self.jobs.len() {
            self.visit(i, &mut colours, &mut order)?;
        }
        Ok(order)
    }

    fn visit(&self, i: usize, colours: &mut [Colour], order: &mut Vec<usize>) -> Result<()> {
        match colours[i] {
            Colour::Black => return Ok(()),
            Colour::Grey => {
                return Err(Error::validation(format!(
                    "dependency cycle involving job '{}'",
                    self.jobs[i].job.qualified_name()
                )));
            }
            Colour::White => {}
        }
        colours[i] = Colour::Grey;
        for j in self.dependency_indices(i) {
            self.visit(j, colours, order)?;
        }
        colours[i] = Colour::Black;
        order.push(i);
        Ok(())
    }

    /// Visit jobs in topological order of the dependency graph (or reverse),
    /// calling `f` per job graph.
    pub fn walk(
        &self,
        reverse: bool,
        mut f: impl FnMut(&JobGraph) -> Result<()>,
    ) -> Result<()> {
        let mut order = self.topo_order()?;
        if reverse {
            order.reverse();
        }
        for i in order {
            f(&self.jobs[i])?;
        }
        Ok(())
    }

    /// Restrict the graph to the named jobs plus their transitive
    /// dependencies. Every node must name a job.
    pub fn trim(&mut self, nodes_to_run: &[NodeRef]) -> Result<()> {
        let mut stack = Vec::new();
        for node in nodes_to_run {
            let Some(job_name) = &node.job else {
                return Err(Error::validation(format!(
                    "node '{}' names a workflow, not a job",
                    node
                )));
            };
            let idx = self
                .jobs
                .iter()
                .position(|jg| jg.job.workflow == node.workflow && jg.job.name == *job_name)
                .ok_or_else(|| Error::validation(format!("unknown job '{}'", node)))?;
            stack.push(idx);
        }

        let mut keep = BTreeSet::new();
        while let Some(i) = stack.pop() {
            if keep.insert(i) {
                stack.extend(self.dependency_indices(i));
            }
        }

        let mut i = 0;
        self.jobs.retain(|_| {
            let kept = keep.contains(&i);
            i += 1;
            kept
        });
        Ok(())
    }
}

/// Step indices of a job in topological order of the intra-job dependency
/// graph.
pub fn step_topo_order(job_graph: &JobGraph) -> Result<Vec<usize>> {
    let by_name: BTreeMap<&str, usize> = job_graph
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.as_str(), i))
        .collect();

    fn visit(
        jg: &JobGraph,
        by_name: &BTreeMap<&str, usize>,
        i: usize,
        colours: &mut [Colour],
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match colours[i] {
            Colour::Black => return Ok(()),
            Colour::Grey => {
                return Err(Error::validation(format!(
                    "dependency cycle involving step '{}' in job '{}'",
                    jg.steps[i].name,
                    jg.job.qualified_name()
                )));
            }
            Colour::White => {}
        }
        colours[i] = Colour::Grey;
        for dep in &jg.steps[i].depends {
            if let Some(&j) = by_name.get(dep.step_name.as_str()) {
                visit(jg, by_name, j, colours, order)?;
            }
        }
        colours[i] = Colour::Black;
        order.push(i);
        Ok(())
    }

    let mut colours = vec![Colour::White; job_graph.steps.len()];
    let mut order = Vec::with_capacity(job_graph.steps.len());
    for i in 0..job_graph.steps.len() {
        visit(job_graph, &by_name, i, &mut colours, &mut order)?;
    }
    Ok(order)
}

#[derive(Serialize)]
struct StepProjection<'a> {
    name: &'a str,
    commands: &'a [String],
    depends: Vec<&'a crate::step::StepDependency>,
}

#[derive(Serialize)]
struct JobProjection<'a> {
    workflow: &'a str,
    name: &'a str,
    job_type: &'a JobType,
    docker_image: &'a Option<String>,
    runs_on: &'a BTreeSet<String>,
    depends: Vec<&'a JobDependency>,
    services: Vec<&'a ServiceDefinition>,
    environment: &'a BTreeMap<String, String>,
    artifact_definitions: Vec<&'a ArtifactDefinition>,
    fingerprint_commands: &'a [String],
    step_execution: StepExecution,
    steps: Vec<StepProjection<'a>>,
}

/// Stable hash of a job's definition including its steps.
///
/// Collection-valued fields whose order carries no meaning (dependencies,
/// labels, services, artifact groups) are hashed in sorted order so two
/// definitions differing only in listing order hash identically. Command
/// sequences keep their order.
pub fn definition_hash(job: &Job, steps: &[Step]) -> String {
    fn sorted<T: Ord>(items: &[T]) -> Vec<&T> {
        let mut v: Vec<&T> = items.iter().collect();
        v.sort();
        v
    }

    let projection = JobProjection {
        workflow: &job.workflow,
        name: &job.name,
        job_type: &job.job_type,
        docker_image: &job.docker_image,
        runs_on: &job.runs_on,
        depends: sorted(&job.depends),
        services: sorted(&job.services),
        environment: &job.environment,
        artifact_definitions: sorted(&job.artifact_definitions),
        fingerprint_commands: &job.fingerprint_commands,
        step_execution: job.step_execution,
        steps: steps
            .iter()
            .map(|s| StepProjection {
                name: &s.name,
                commands: &s.commands,
                depends: sorted(&s.depends),
            })
            .collect(),
    };

    match serde_json::to_vec(&projection) {
        Ok(bytes) => sha256_hex(&bytes),
        // Serialization of plain data cannot fail.
        Err(_) => String::from("!unhashable"),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
