// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::step::StepDependency;
use crate::test_support::{build_graph, job_graph, linux_job, linux_job_depending_on};
use proptest::prelude::*;

fn chain(names: &[&str]) -> BuildGraph {
    let mut jobs = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if i == 0 {
            jobs.push(linux_job(name));
        } else {
            jobs.push(linux_job_depending_on(name, &[names[i - 1]]));
        }
    }
    build_graph(jobs)
}

#[test]
fn populate_defaults_assigns_ids_and_links() {
    let mut graph = build_graph(vec![linux_job("a")]);
    graph.populate_defaults(500);

    assert!(!graph.build.id.is_empty());
    let jg = &graph.jobs[0];
    assert!(!jg.job.id.is_empty());
    assert_eq!(jg.job.build_id, graph.build.id);
    assert_eq!(jg.job.repo_id, graph.build.repo_id);
    assert_eq!(jg.job.timings.queued_at_ms, Some(500));
    assert!(!jg.job.definition_data_hash.is_empty());

    let step = &jg.steps[0];
    assert_eq!(step.job_id, jg.job.id);
    assert_eq!(step.build_id, graph.build.id);
    assert_eq!(step.timings.queued_at_ms, Some(500));
}

#[test]
fn populate_defaults_keeps_existing_ids() {
    let mut graph = build_graph(vec![linux_job("a")]);
    graph.populate_defaults(500);
    let build_id = graph.build.id;
    let job_id = graph.jobs[0].job.id;

    graph.populate_defaults(900);
    assert_eq!(graph.build.id, build_id);
    assert_eq!(graph.jobs[0].job.id, job_id);
    // First stamp wins.
    assert_eq!(graph.jobs[0].job.timings.queued_at_ms, Some(500));
}

#[test]
fn walk_visits_dependencies_first() {
    let graph = chain(&["a", "b", "c"]);
    let mut seen = Vec::new();
    graph
        .walk(false, |jg| {
            seen.push(jg.job.name.clone());
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, vec!["a", "b", "c"]);
}

#[test]
fn reverse_walk_visits_dependents_first() {
    let graph = chain(&["a", "b", "c"]);
    let mut seen = Vec::new();
    graph
        .walk(true, |jg| {
            seen.push(jg.job.name.clone());
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, vec!["c", "b", "a"]);
}

#[test]
fn walk_reports_cycles() {
    let graph = build_graph(vec![
        linux_job_depending_on("a", &["b"]),
        linux_job_depending_on("b", &["a"]),
    ]);
    let result = graph.walk(false, |_| Ok(()));
    assert!(matches!(result, Err(crate::error::Error::ValidationFailed(_))));
}

#[test]
fn trim_keeps_transitive_dependencies() {
    let mut graph = chain(&["a", "b", "c"]);
    graph.push_job(job_graph(linux_job("orphan")));

    graph.trim(&[crate::build::NodeRef::job("", "c")]).unwrap();
    let names: Vec<_> = graph.jobs.iter().map(|jg| jg.job.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn trim_rejects_workflow_refs() {
    let mut graph = chain(&["a"]);
    let err = graph.trim(&[crate::build::NodeRef::workflow("deploy")]).unwrap_err();
    assert!(matches!(err, crate::error::Error::ValidationFailed(_)));
}

#[test]
fn trim_rejects_unknown_jobs() {
    let mut graph = chain(&["a"]);
    let err = graph.trim(&[crate::build::NodeRef::job("", "nope")]).unwrap_err();
    assert!(matches!(err, crate::error::Error::ValidationFailed(_)));
}

#[test]
fn step_order_honours_dependencies() {
    let mut jg = job_graph(linux_job("a"));
    jg.steps = vec![
        {
            let mut s = crate::step::Step::new("last", vec![]);
            s.depends = vec![StepDependency::new("first")];
            s
        },
        crate::step::Step::new("first", vec![]),
    ];
    let order = step_topo_order(&jg).unwrap();
    assert_eq!(order, vec![1, 0]);
}

#[test]
fn definition_hash_ignores_dependency_order() {
    let mut a = linux_job_depending_on("x", &["p", "q"]);
    let mut b = linux_job_depending_on("x", &["q", "p"]);
    a.fingerprint_commands = vec!["cat Cargo.lock".to_string()];
    b.fingerprint_commands = vec!["cat Cargo.lock".to_string()];
    assert_eq!(definition_hash(&a, &[]), definition_hash(&b, &[]));
}

#[test]
fn definition_hash_keeps_command_order() {
    let step_ab = crate::step::Step::new("s", vec!["a".into(), "b".into()]);
    let step_ba = crate::step::Step::new("s", vec!["b".into(), "a".into()]);
    let job = linux_job("x");
    assert_ne!(
        definition_hash(&job, &[step_ab]),
        definition_hash(&job, &[step_ba])
    );
}

proptest! {
    #[test]
    fn hash_is_stable_under_label_insertion_order(labels in proptest::collection::vec("[a-z]{1,8}", 1..6)) {
        let mut a = linux_job("x");
        let mut b = linux_job("x");
        for l in &labels {
            a.runs_on.insert(l.clone());
        }
        for l in labels.iter().rev() {
            b.runs_on.insert(l.clone());
        }
        prop_assert_eq!(definition_hash(&a, &[]), definition_hash(&b, &[]));
    }
}
