//! CLI tests for `demo-runner list` and `demo-runner init`.

use std::process::Command;

use demo_runner::core::plan::default_steps;
use demo_runner::exit_codes;
use demo_runner::io::config::{PlanConfig, load_config};
use serde_json::Value;

#[test]
fn list_json_prints_builtin_plan_without_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_demo-runner"))
        .current_dir(temp.path())
        .args(["list", "--json"])
        .output()
        .expect("demo-runner list");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let listing: Value = serde_json::from_slice(&output.stdout).expect("json");
    let ids: Vec<&str> = listing["steps"]
        .as_array()
        .expect("steps array")
        .iter()
        .filter_map(|step| step["id"].as_str())
        .collect();
    let expected: Vec<String> = default_steps().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(listing["required_env"][2], "APIGEE_ENV");
}

#[test]
fn init_writes_loadable_default_plan() {
    let temp = tempfile::tempdir().expect("tempdir");
    let status = Command::new(env!("CARGO_BIN_EXE_demo-runner"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("demo-runner init");
    assert_eq!(status.code(), Some(exit_codes::OK));

    let cfg = load_config(&temp.path().join("demo-runner.toml")).expect("load");
    assert_eq!(cfg, PlanConfig::default());

    let again = Command::new(env!("CARGO_BIN_EXE_demo-runner"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("demo-runner init again");
    assert_eq!(again.code(), Some(exit_codes::FAILURE));
}
