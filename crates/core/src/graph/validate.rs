// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-graph validation: limits, duplicate names, dangling references,
//! cycle detection.

use super::{step_topo_order, BuildGraph};
use crate::config::Limits;
use crate::error::{Error, Result};
use std::collections::BTreeSet;

impl BuildGraph {
    /// Check the whole graph against the configured limits.
    ///
    /// A dependency on a workflow that is absent from the graph entirely is
    /// deferred, not an error: the workflow may be added later by dynamic
    /// extension, and re-validation of the merged graph resolves it. A
    /// dependency naming a missing job inside a present workflow is a
    /// dangling reference.
    ///
    /// Produces `ValidationFailed` only.
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        if self.jobs.len() > limits.max_jobs_per_build {
            return Err(Error::validation(format!(
                "build has {} jobs, limit is {}",
                self.jobs.len(),
                limits.max_jobs_per_build
            )));
        }

        let mut job_names = BTreeSet::new();
        for jg in &self.jobs {
            if jg.job.name.is_empty() {
                return Err(Error::validation("job with empty name"));
            }
            if !job_names.insert((jg.job.workflow.as_str(), jg.job.name.as_str())) {
                return Err(Error::validation(format!(
                    "duplicate job name '{}'",
                    jg.job.qualified_name()
                )));
            }
        }

        for (i, jg) in self.jobs.iter().enumerate() {
            if jg.steps.len() > limits.max_steps_per_job {
                return Err(Error::validation(format!(
                    "job '{}' has {} steps, limit is {}",
                    jg.job.qualified_name(),
                    jg.steps.len(),
                    limits.max_steps_per_job
                )));
            }

            let mut step_names = BTreeSet::new();
            for step in &jg.steps {
                if step.name.is_empty() {
                    return Err(Error::validation(format!(
                        "step with empty name in job '{}'",
                        jg.job.qualified_name()
                    )));
                }
                if !step_names.insert(step.name.as_str()) {
                    return Err(Error::validation(format!(
                        "duplicate step name '{}' in job '{}'",
                        step.name,
                        jg.job.qualified_name()
                    )));
                }
            }
            for step in &jg.steps {
                for dep in &step.depends {
                    if !step_names.contains(dep.step_name.as_str()) {
                        return Err(Error::validation(format!(
                            "step '{}' in job '{}' depends on unknown step '{}'",
                            step.name,
                            jg.job.qualified_name(),
                            dep.step_name
                        )));
                    }
                }
            }
            step_topo_order(jg)?;

            for dep in &jg.job.depends {
                if dep.job_name.is_empty() {
                    return Err(Error::validation(format!(
                        "job '{}' has a dependency with no job name",
                        jg.job.qualified_name()
                    )));
                }
                if !self.has_workflow(&dep.workflow) {
                    // Deferred cross-workflow dependency.
                    continue;
                }
                // A present workflow must yield at least one target, for
                // wildcards too: a wildcard resolving to nothing (a lone
                // job naming its own single-job workflow) dangles just the
                // same as a missing name.
                if self.resolve_dependency(i, dep).is_empty() {
                    return Err(Error::validation(format!(
                        "job '{}' depends on unknown job '{}'",
                        jg.job.qualified_name(),
                        dep
                    )));
                }
            }
        }

        self.topo_order()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
