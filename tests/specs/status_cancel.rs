//! `wave status` and `wave cancel` specs against runs that do not exist,
//! and against a run driven to completion by `wave run`.

use crate::prelude::*;

#[test]
fn status_on_unknown_run_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);

    project
        .wave()
        .args(&["status", "no-such-run"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn cancel_on_unknown_run_fails() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);

    project
        .wave()
        .args(&["cancel", "no-such-run"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn run_completes_and_status_reports_it() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file("pipeline.yaml", TRIVIAL_PIPELINE);

    let run = project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "hello"])
        .passes();
    let stdout = run.stdout();
    // `wave run`'s human-readable confirmation line names the run id;
    // the NDJSON event stream also lands on stdout.
    assert!(stdout.contains("completed"), "stdout: {stdout}");

    let run_id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("run ")?.strip_suffix(" completed"))
        .expect("run id printed on completion")
        .to_string();

    project
        .wave()
        .args(&["status", &run_id])
        .passes()
        .stdout_has("status:")
        .stdout_has("completed");

    // Cancelling an already-terminal run is a no-op, not an error.
    project
        .wave()
        .args(&["cancel", &run_id])
        .passes()
        .stdout_has("already completed");
}

#[test]
fn status_json_is_well_formed() {
    let project = Project::empty();
    project.file("wave.yaml", NOOP_MANIFEST);
    project.file("prompts/noop.txt", NOOP_PROMPT);
    project.file("pipeline.yaml", TRIVIAL_PIPELINE);

    let run = project
        .wave()
        .args(&["run", "pipeline.yaml", "--input", "hello"])
        .passes();
    let run_id = run
        .stdout()
        .lines()
        .find_map(|line| line.strip_prefix("run ")?.strip_suffix(" completed"))
        .expect("run id printed on completion")
        .to_string();

    let status = project
        .wave()
        .args(&["status", &run_id, "--json"])
        .passes();
    let value: serde_json::Value =
        serde_json::from_str(&status.stdout()).expect("status --json prints one JSON object");
    assert_eq!(value["run"]["status"], "completed");
}
