// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runner registry: agent registration, updates, retirement and the
//! capability check the enqueue path relies on.

use crate::Engine;
use derrick_core::{
    Clock, Credential, Error, Etag, Job, JobType, LegalEntityId, Result, Runner, RunnerId,
    RUNNER_GROUP,
};
use std::collections::BTreeSet;

/// Source-system tag for memberships the registry itself manages.
const REGISTRY_SOURCE: &str = "runner-registry";

/// Credentials removed per transaction page when retiring a runner.
const CREDENTIAL_PURGE_PAGE: usize = 50;

/// Registration payload for a new runner agent.
#[derive(Debug, Clone)]
pub struct RunnerRegistration {
    pub legal_entity_id: LegalEntityId,
    pub name: String,
    pub os: String,
    pub arch: String,
    pub labels: BTreeSet<String>,
    pub supported_job_types: BTreeSet<JobType>,
    /// DER-encoded client certificate to store as a credential.
    pub client_certificate_der: Option<Vec<u8>>,
}

/// Mutable fields of a registered runner. Label and type sets replace the
/// stored sets wholesale; the registry computes the deltas.
#[derive(Debug, Clone, Default)]
pub struct RunnerUpdate {
    pub labels: Option<BTreeSet<String>>,
    pub supported_job_types: Option<BTreeSet<JobType>>,
    pub enabled: Option<bool>,
}

impl<C: Clock> Engine<C> {
    /// Register a runner agent.
    ///
    /// The OS and architecture join the label set idempotently. The runner
    /// gets an ownership row under its legal entity, a dedicated identity
    /// (owned by the runner), membership in the entity's standard `runner`
    /// group, and optionally a client-certificate credential.
    pub fn create_runner(&self, registration: RunnerRegistration) -> Result<Runner> {
        if registration.name.is_empty() {
            return Err(Error::validation("runner name must not be empty"));
        }
        if registration.os.is_empty() || registration.arch.is_empty() {
            return Err(Error::validation("runner os and arch must not be empty"));
        }
        let now = self.clock().epoch_ms();

        self.store().write(|db| {
            let mut runner = Runner::new(
                registration.legal_entity_id,
                registration.name.clone(),
                registration.os.clone(),
                registration.arch.clone(),
            );
            runner.labels.extend(registration.labels.iter().cloned());
            if !registration.supported_job_types.is_empty() {
                runner.supported_job_types = registration.supported_job_types.clone();
            }
            runner.apply_default_labels();
            let runner = db.insert_runner(runner, now)?;

            let identity =
                db.create_identity(runner.id, &format!("runner-{}", runner.name), now)?;
            let group = db.find_group(runner.legal_entity_id, RUNNER_GROUP)?;
            db.add_group_membership(group.id, identity.id, REGISTRY_SOURCE, now)?;

            if let Some(der) = registration.client_certificate_der.clone() {
                db.create_credential(Credential::client_certificate(identity.id, der), now)?;
            }

            tracing::info!(runner = %runner.id, name = %runner.name, "runner registered");
            Ok(runner)
        })
    }

    /// Update a runner's label set, supported types or enablement,
    /// addressed by etag.
    pub fn update_runner(
        &self,
        runner_id: RunnerId,
        update: RunnerUpdate,
        expected: &Etag,
    ) -> Result<Runner> {
        self.store().write(|db| {
            let mut runner = db.read_runner(runner_id)?;

            if let Some(labels) = &update.labels {
                let added: Vec<_> = labels.difference(&runner.labels).cloned().collect();
                let removed: Vec<_> = runner.labels.difference(labels).cloned().collect();
                if !added.is_empty() || !removed.is_empty() {
                    tracing::debug!(
                        runner = %runner.id,
                        ?added,
                        ?removed,
                        "runner labels changed"
                    );
                }
                runner.labels = labels.clone();
            }
            if let Some(types) = &update.supported_job_types {
                runner.supported_job_types = types.clone();
            }
            if let Some(enabled) = update.enabled {
                runner.enabled = enabled;
            }
            runner.apply_default_labels();

            db.update_runner(runner, expected)
        })
    }

    /// Retire a runner: leave the `runner` group, purge every credential on
    /// the runner's identity (in pages), soft-delete the runner row.
    pub fn soft_delete_runner(&self, runner_id: RunnerId) -> Result<()> {
        let now = self.clock().epoch_ms();
        self.store().write(|db| {
            let runner = db.read_runner(runner_id)?;

            if let Some(identity) = db.identity_for_owner(runner.id.into()) {
                let group = db.find_group(runner.legal_entity_id, RUNNER_GROUP)?;
                db.remove_all_group_memberships(group.id, identity.id);

                loop {
                    let page: Vec<_> = db
                        .credentials_for_identity(identity.id)
                        .into_iter()
                        .take(CREDENTIAL_PURGE_PAGE)
                        .collect();
                    if page.is_empty() {
                        break;
                    }
                    for credential in page {
                        db.delete_credential(credential.id)?;
                    }
                }
            }

            db.soft_delete_runner(runner_id, now)?;
            tracing::info!(runner = %runner_id, "runner retired");
            Ok(())
        })
    }

    /// Whether any live enabled runner of the job's owning legal entity
    /// could execute the job.
    pub fn runner_compatible_with_job(&self, job: &Job) -> Result<bool> {
        self.store().read(|db| {
            let repo = db.read_repo(job.repo_id)?;
            Ok(db.any_capable_runner(repo.legal_entity_id, job))
        })
    }
}

#[cfg(test)]
#[path = "runners_tests.rs"]
mod tests;
