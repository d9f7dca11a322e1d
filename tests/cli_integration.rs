//! End-to-end tests for the mappcheck binary.

use std::path::PathBuf;
use std::process::Command;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn mappcheck() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mappcheck"));
    cmd.env_remove("MAPPCHECK_LOG");
    cmd
}

#[test]
fn test_clean_project_exits_zero() {
    let output = mappcheck()
        .arg("check")
        .arg(testdata_path().join("flutter_app"))
        .arg("--config")
        .arg(testdata_path().join("mappcheck.yaml"))
        .args(["--format", "json"])
        .output()
        .expect("should run binary");

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["passed"], true);
    assert_eq!(value["files_analyzed"], 1);
}

#[test]
fn test_broken_project_exits_one() {
    let output = mappcheck()
        .arg("check")
        .arg(testdata_path().join("flutter_broken"))
        .arg("--config")
        .arg(testdata_path().join("mappcheck.yaml"))
        .args(["--format", "host"])
        .output()
        .expect("should run binary");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let (_, diagnostics) = value
        .as_object()
        .and_then(|files| files.iter().next())
        .expect("one file");
    assert_eq!(diagnostics.as_array().map(Vec::len), Some(3));
    assert_eq!(diagnostics[0]["source"], "mappcheck");
}

#[test]
fn test_project_without_sdk_usage_exits_one() {
    let output = mappcheck()
        .arg("check")
        .arg(testdata_path().join("flutter_app/lib/widgets.dart"))
        .arg("--config")
        .arg(testdata_path().join("mappcheck.yaml"))
        .args(["--format", "json"])
        .output()
        .expect("should run binary");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["files_analyzed"], 0);
    assert_eq!(
        value["project"][0]["message"],
        "No Mapp SDK code found in the project"
    );
}

#[test]
fn test_missing_path_exits_two() {
    let output = mappcheck()
        .args(["check", "/definitely/not/here", "--format", "json"])
        .arg("--config")
        .arg(testdata_path().join("mappcheck.yaml"))
        .output()
        .expect("should run binary");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_rules_json() {
    let output = mappcheck()
        .args(["rules", "flutter", "--format", "json"])
        .output()
        .expect("should run binary");

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value[0]["technology"], "flutter");
    assert_eq!(value[0]["initialization"]["method"], "engage");
}
