use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCENARIO: &str = r#"{
  "components": [
    { "id": "lib:core:1.0", "dependencies": [
        { "requested": "lib:util:2.0", "selected": "lib:util:2.0", "variant": "lib:util:2.0-variant" } ] },
    { "id": "lib:util:2.0" }
  ],
  "groups": [
    { "name": "runtime", "dependencies": [
        { "requested": "lib:core:1.0", "selected": "lib:core:1.0", "variant": "lib:core:1.0-variant" } ] }
  ]
}"#;

const CYCLE: &str = r#"{
  "components": [
    { "id": "a", "dependencies": [ { "requested": "b", "selected": "b" } ] },
    { "id": "b", "dependencies": [ { "requested": "a", "selected": "a" } ] }
  ],
  "groups": [
    { "name": "runtime", "dependencies": [
        { "requested": "a", "selected": "a" },
        { "requested": "nope:1.0" } ] }
  ]
}"#;

#[allow(deprecated)]
fn depdump_cmd() -> Command {
    Command::cargo_bin("depdump").unwrap()
}

#[test]
fn test_dump_compact_scenario() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("snapshot.json"), SCENARIO).unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json", "--compact", "-o", "deps.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));

    let written = fs::read_to_string(tmp.path().join("deps.json")).unwrap();
    assert_eq!(
        written,
        r#"{"runtime":[{"requested":"lib:core:1.0","resolved":"lib:core:1.0-variant","dependencies":[{"requested":"lib:util:2.0","resolved":"lib:util:2.0-variant","dependencies":[]}]}]}"#
    );
}

#[test]
fn test_dump_default_output_is_pretty() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("snapshot.json"), SCENARIO).unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json"])
        .assert()
        .success();

    let written = fs::read_to_string(tmp.path().join("build/dependencies.json")).unwrap();
    assert!(written.starts_with("{\n  \"runtime\": [\n"));
    assert!(written.ends_with("}\n"));
}

#[test]
fn test_dump_twice_reports_fresh() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("snapshot.json"), SCENARIO).unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json"])
        .assert()
        .success();
    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Fresh"));
}

#[test]
fn test_dump_cycle_terminates_and_warns_unresolved() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("snapshot.json"), CYCLE).unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json", "-o", "deps.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 requests could not be resolved"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("deps.json")).unwrap()).unwrap();
    assert_eq!(
        value["runtime"][0]["dependencies"][0]["dependencies"][0]["alreadySeen"],
        serde_json::Value::Bool(true)
    );
    assert_eq!(
        value["runtime"][1],
        serde_json::json!({"requested": "nope:1.0", "resolved": false})
    );
}

#[test]
fn test_dump_missing_snapshot_fails() {
    let tmp = TempDir::new().unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

#[test]
fn test_dump_invalid_snapshot_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("snapshot.json"),
        r#"{"groups":[{"name":"runtime","dependencies":[{"requested":"x","selected":"x"}]}]}"#,
    )
    .unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown component"));
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_dump_bad_config_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("snapshot.json"), SCENARIO).unwrap();
    fs::write(tmp.path().join("depdump.toml"), "[output\n").unwrap();

    depdump_cmd()
        .current_dir(tmp.path())
        .args(["dump", "snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
