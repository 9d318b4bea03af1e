use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

const STEPS: &str = "tests/fixtures/signup_steps.json";
const ROWS: &str = "tests/fixtures/people.csv";
const PAGE: &str = "tests/fixtures/signup_page.yaml";

fn formpilot() -> Command {
    let mut cmd = Command::cargo_bin("formpilot").expect("binary built");
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 output")
}

fn json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn example_prints_the_builtin_program() {
    let assert = formpilot().arg("example").assert().success();
    let value: Value = serde_json::from_str(&stdout_of(assert.get_output())).expect("valid json");

    let steps = value.as_array().unwrap();
    assert_eq!(steps.len(), 7);
    assert_eq!(steps[0]["action"], "wait");
    assert_eq!(steps[3]["text"], "{{value}}");
    assert_eq!(steps[6]["behavior"], "smooth");
}

#[test]
fn rows_summarises_the_dataset() {
    assert!(Path::new(ROWS).exists(), "fixture missing");
    let assert = formpilot().args(["rows", ROWS]).assert().success();
    assert_eq!(
        stdout_of(assert.get_output()).trim(),
        "Loaded 2 row(s). Fields: name, email"
    );
}

#[test]
fn expand_repeats_each_row_contiguously() {
    let assert = formpilot()
        .args(["--output", "json", "expand", "--steps", STEPS, "--rows", ROWS, "--repeat", "2"])
        .assert()
        .success();
    let value: Value = serde_json::from_str(&stdout_of(assert.get_output())).expect("valid json");

    let stream = value.as_array().unwrap();
    assert_eq!(stream.len(), 2 * 2 * 5);
    assert_eq!(stream[1]["text"], "Ada Lovelace");
    assert_eq!(stream[6]["text"], "Ada Lovelace");
    assert_eq!(stream[11]["text"], "Alan Turing");
    assert_eq!(stream[17]["text"], "alan@example.com");
}

#[test]
fn run_streams_status_and_completes() {
    let assert = formpilot()
        .args([
            "--output", "json", "run", "--steps", STEPS, "--rows", ROWS, "--page", PAGE,
            "--journal",
        ])
        .assert()
        .success();
    let lines = json_lines(&stdout_of(assert.get_output()));

    let statuses: Vec<&str> = lines
        .iter()
        .filter(|line| line["type"] == "status_changed")
        .filter_map(|line| line["text"].as_str())
        .collect();
    assert_eq!(statuses.first(), Some(&"Automation running..."));
    assert!(statuses.contains(&"Step 1/10: waitFor"));
    assert!(statuses.contains(&"Step 10/10: click"));
    assert_eq!(statuses.last(), Some(&"Automation completed."));

    let pasted: Vec<&str> = lines
        .iter()
        .filter(|line| line["event"] == "set_value" && line["selector"] == "#email")
        .filter_map(|line| line["value"].as_str())
        .collect();
    assert_eq!(pasted, vec!["ada@example.com", "alan@example.com"]);

    let report = lines.last().unwrap();
    assert_eq!(report["outcome"]["state"], "completed");
    assert_eq!(report["steps_completed"], 10);
}

#[test]
fn run_without_selector_match_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let steps = dir.path().join("steps.json");
    std::fs::write(
        &steps,
        r##"[{"action": "waitFor", "selector": "#missing", "timeoutMs": 300}]"##,
    )
    .unwrap();

    let assert = formpilot()
        .args(["run", "--steps", steps.to_str().unwrap(), "--page", PAGE])
        .assert()
        .failure();
    let stdout = stdout_of(assert.get_output());
    assert!(
        stdout.contains("Error: Timeout waiting for selector: #missing"),
        "{stdout}"
    );
    assert!(stdout.contains("0/1 step(s) completed"), "{stdout}");
}

#[test]
fn run_stops_at_unknown_action_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let steps = dir.path().join("steps.json");
    let report = dir.path().join("report.json");
    std::fs::write(
        &steps,
        r##"[{"action": "click", "selector": "#submit"}, {"action": "nope"}, {"action": "click", "selector": "#submit"}]"##,
    )
    .unwrap();

    let assert = formpilot()
        .args([
            "run",
            "--steps",
            steps.to_str().unwrap(),
            "--page",
            PAGE,
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .failure();
    let stdout = stdout_of(assert.get_output());
    assert!(stdout.contains("Step 1/3: click"), "{stdout}");
    assert!(!stdout.contains("Step 2/3"), "{stdout}");
    assert!(stdout.contains("Error: Unknown action: nope"), "{stdout}");

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).expect("report json");
    assert_eq!(written["outcome"]["state"], "failed");
    assert_eq!(written["outcome"]["message"], "Unknown action: nope");
    assert_eq!(written["steps_total"], 3);
    assert_eq!(written["steps_completed"], 1);
}

#[test]
fn invalid_program_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let steps = dir.path().join("steps.json");
    std::fs::write(&steps, "not json").unwrap();

    let assert = formpilot()
        .args(["expand", "--steps", steps.to_str().unwrap()])
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("Invalid JSON"), "{stderr}");
}
