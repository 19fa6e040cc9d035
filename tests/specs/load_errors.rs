//! Load-time error specs: missing files, malformed documents, cycles.

use crate::prelude::*;

#[test]
fn missing_pipeline_file_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);

    project
        .wave()
        .args(&["run", "no-such-pipeline.yaml", "--input", "x"])
        .fails()
        .stderr_has("failed to read pipeline");
}

#[test]
fn missing_manifest_fails() {
    let project = Project::empty();
    project.file("pipeline.yaml", TRIVIAL_PIPELINE);

    project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "x"])
        .fails()
        .stderr_has("failed to read manifest");
}

#[test]
fn wrong_kind_document_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file(
        "pipeline.yaml",
        "kind: SomethingElse\nmetadata:\n  name: x\ninput:\n  source: cli\nsteps: []\n",
    );

    project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "x"])
        .fails()
        .stderr_has("WavePipeline");
}

#[test]
fn unknown_persona_reference_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file(
        "pipeline.yaml",
        r#"
kind: WavePipeline
metadata:
  name: bad
input:
  source: cli
steps:
  - id: only
    persona: nonexistent
    exec:
      type: prompt
      source: "hi"
"#,
    );

    project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "x"])
        .fails()
        .stderr_has("nonexistent");
}

#[test]
fn cycle_is_rejected_at_load() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file(
        "pipeline.yaml",
        r#"
kind: WavePipeline
metadata:
  name: cyclic
input:
  source: cli
steps:
  - id: a
    persona: noop
    dependencies: [c]
    exec:
      type: prompt
      source: "a"
  - id: b
    persona: noop
    dependencies: [a]
    exec:
      type: prompt
      source: "b"
  - id: c
    persona: noop
    dependencies: [b]
    exec:
      type: prompt
      source: "c"
"#,
    );

    project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "x"])
        .fails()
        .stderr_has("cycle");
}

#[test]
fn missing_cli_input_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file("pipeline.yaml", TRIVIAL_PIPELINE);

    project
        .wave()
        .args(&["run", "pipeline.yaml"])
        .fails()
        .stderr_has("requires --input");
}

#[test]
fn from_step_without_resume_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file("pipeline.yaml", TRIVIAL_PIPELINE);

    project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "x", "--from-step", "only"])
        .fails()
        .stderr_has("--resume");
}
