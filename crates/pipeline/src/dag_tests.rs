// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wave_core::test_support::{trivial_pipeline, trivial_step};
use wave_core::ArtifactName;

fn pipeline_with_steps(steps: Vec<wave_core::StepDef>) -> Pipeline {
    let mut p = trivial_pipeline("demo", "unused", "coder");
    p.steps = steps;
    p
}

#[test]
fn explicit_dependency_becomes_a_predecessor_edge() {
    let mut b = trivial_step("b", "coder");
    b.dependencies = vec![StepId::new("a")];
    let p = pipeline_with_steps(vec![trivial_step("a", "coder"), b]);

    let dag = build(&p).unwrap();
    assert_eq!(dag.predecessors_of(&StepId::new("b")), &[StepId::new("a")]);
    assert_eq!(dag.order, vec![StepId::new("a"), StepId::new("b")]);
}

#[test]
fn implicit_edge_from_injection_is_unioned_with_explicit_deps() {
    let mut b = trivial_step("b", "coder");
    b.dependencies = vec![StepId::new("x")];
    b.memory.inject_artifacts = vec![wave_core::ArtifactRef {
        step_id: StepId::new("a"),
        artifact_name: ArtifactName::new("spec"),
        local_alias: "spec.json".into(),
    }];
    let p = pipeline_with_steps(vec![
        trivial_step("x", "coder"),
        trivial_step("a", "coder"),
        b,
    ]);

    let dag = build(&p).unwrap();
    let preds = dag.predecessors_of(&StepId::new("b"));
    assert!(preds.contains(&StepId::new("x")));
    assert!(preds.contains(&StepId::new("a")));
    assert_eq!(preds.len(), 2);
}

#[test]
fn injection_edge_is_not_duplicated_when_also_an_explicit_dependency() {
    let mut b = trivial_step("b", "coder");
    b.dependencies = vec![StepId::new("a")];
    b.memory.inject_artifacts = vec![wave_core::ArtifactRef {
        step_id: StepId::new("a"),
        artifact_name: ArtifactName::new("spec"),
        local_alias: "spec.json".into(),
    }];
    let p = pipeline_with_steps(vec![trivial_step("a", "coder"), b]);

    let dag = build(&p).unwrap();
    assert_eq!(dag.predecessors_of(&StepId::new("b")).len(), 1);
}

#[test]
fn three_cycle_is_rejected_naming_a_member() {
    let mut a = trivial_step("a", "coder");
    a.dependencies = vec![StepId::new("c")];
    let mut b = trivial_step("b", "coder");
    b.dependencies = vec![StepId::new("a")];
    let mut c = trivial_step("c", "coder");
    c.dependencies = vec![StepId::new("b")];
    let p = pipeline_with_steps(vec![a, b, c]);

    let err = build(&p).unwrap_err();
    match err {
        LoadError::CycleDetected(member) => {
            assert!(["a", "b", "c"].contains(&member.as_str()))
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn self_dependency_is_a_cycle() {
    let mut a = trivial_step("a", "coder");
    a.dependencies = vec![StepId::new("a")];
    let p = pipeline_with_steps(vec![a]);
    assert!(matches!(build(&p), Err(LoadError::CycleDetected(_))));
}

#[test]
fn ties_break_by_declaration_order() {
    // b and c both depend only on a; declaration order is a, c, b.
    let mut c = trivial_step("c", "coder");
    c.dependencies = vec![StepId::new("a")];
    let mut b = trivial_step("b", "coder");
    b.dependencies = vec![StepId::new("a")];
    let p = pipeline_with_steps(vec![trivial_step("a", "coder"), c, b]);

    let dag = build(&p).unwrap();
    assert_eq!(
        dag.order,
        vec![StepId::new("a"), StepId::new("c"), StepId::new("b")]
    );
}
