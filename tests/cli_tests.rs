//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::write_tree;
use predicates::prelude::*;

const DEPLOY: &str = r#"
type: suite
name: deploy
meta:
  requires: [host]
children:
  - type: noop
    name: lookup
    meta:
      exports: [addr]
  - type: retry
    tries: 2
    delay: 10ms
    child:
      type: noop
      name: ping
      meta:
        requires: [addr]
"#;

fn trellis() -> Command {
    Command::cargo_bin("trellis").unwrap()
}

#[test]
fn test_cli_help_flag() {
    trellis()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_invalid_command() {
    trellis()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_show_prints_outline() {
    let (_dir, path) = write_tree(DEPLOY);

    trellis()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(" - deploy\n   - lookup\n   - retry\n     - ping\n");
}

#[test]
fn test_validate_reports_missing_vars() {
    let (_dir, path) = write_tree(DEPLOY);

    trellis()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(8)
        .stdout(predicate::str::contains("/deploy.host"));
}

#[test]
fn test_validate_passes_with_seeded_vars() {
    let (_dir, path) = write_tree(DEPLOY);

    trellis()
        .args(["validate", "-s", "host=example.com"])
        .arg(&path)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_validate_json_report() {
    let (_dir, path) = write_tree(DEPLOY);

    let output = trellis()
        .args(["validate", "--json"])
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(8));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report,
        serde_json::json!([{ "path": "/deploy", "name": "host" }])
    );
}

#[test]
fn test_malformed_assignment_is_rejected() {
    let (_dir, path) = write_tree(DEPLOY);

    trellis()
        .args(["validate", "-s", "novalue"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("novalue"));
}

#[test]
fn test_missing_definition_file() {
    trellis()
        .args(["show", "/nonexistent/tree.yml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/nonexistent/tree.yml"));
}

#[test]
fn test_unknown_node_type() {
    let (_dir, path) = write_tree("type: mystery\nname: x\n");

    trellis()
        .arg("show")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid definition"));
}

#[cfg(unix)]
#[test]
fn test_eval_success() {
    let (_dir, path) = write_tree(
        r#"
type: suite
name: hello
children:
  - type: sh
    name: greet
    cmd: echo hello {{who}}
"#,
    );

    trellis()
        .args(["eval", "-s", "who=world"])
        .arg(&path)
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn test_eval_failure_reports_path_and_output() {
    let (_dir, path) = write_tree(
        r#"
type: suite
name: deploy
children:
  - type: sh
    name: boom
    cmd: "echo partial; exit 3"
  - type: sh
    name: never
    cmd: "echo never-ran"
"#,
    );

    trellis()
        .arg("eval")
        .arg(&path)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("/deploy/boom"))
        .stderr(predicate::str::contains("-===[BEGIN STDOUT]===-\npartial"))
        .stderr(predicate::str::contains("never-ran").not());
}
