//! CLI tests for `demo-runner run` and `demo-runner check`.
//!
//! Spawns the binary against a plan of `sh` stubs with a cleared environment and
//! verifies exit codes, operator output and which stubs actually ran.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use demo_runner::exit_codes;
use demo_runner::test_support::StubPlan;

const REQUIRED: [&str; 3] = ["PROJECT_ID", "APIGEE_HOST", "APIGEE_ENV"];
const DEMO_IDS: [&str; 6] = ["export", "import", "render", "render-dir", "deploy", "mock"];

fn demo_runner(plan: &StubPlan, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_demo-runner"));
    cmd.current_dir(plan.path())
        .env_clear()
        .arg("--config")
        .arg(plan.config_path())
        .args(args);
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    for (name, value) in vars {
        cmd.env(name, value);
    }
    cmd.output().expect("run demo-runner")
}

fn all_vars() -> Vec<(&'static str, &'static str)> {
    vec![
        ("PROJECT_ID", "demo-project"),
        ("APIGEE_HOST", "api.example.com"),
        ("APIGEE_ENV", "eval"),
    ]
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn unset_env_is_the_only_name_reported() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    let output = demo_runner(
        &plan,
        &["run"],
        &[("PROJECT_ID", "demo-project"), ("APIGEE_HOST", "api.example.com")],
    );

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let stderr = text(&output.stderr);
    assert!(stderr.contains("APIGEE_ENV"), "{stderr}");
    assert!(!stderr.contains("PROJECT_ID"), "{stderr}");
    assert!(!stderr.contains("APIGEE_HOST"), "{stderr}");
    assert!(!text(&output.stdout).contains("Step "));
    assert!(plan.trace().is_empty());
}

#[test]
fn every_missing_subset_is_reported_and_nothing_runs() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    for mask in 0u8..7 {
        let vars: Vec<(&str, &str)> = all_vars()
            .into_iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, pair)| pair)
            .collect();
        let output = demo_runner(&plan, &[], &vars);

        assert_eq!(output.status.code(), Some(exit_codes::FAILURE), "mask {mask:03b}");
        let reported: Vec<String> = text(&output.stderr)
            .lines()
            .filter_map(|line| {
                line.strip_prefix("error: required environment variable ")
                    .and_then(|rest| rest.strip_suffix(" is not set"))
                    .map(str::to_string)
            })
            .collect();
        let expected: Vec<String> = REQUIRED
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) == 0)
            .map(|(_, name)| name.to_string())
            .collect();
        assert_eq!(reported, expected, "mask {mask:03b}");
        assert!(plan.trace().is_empty(), "mask {mask:03b}");
    }
}

#[test]
fn empty_value_counts_as_missing() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    let output = demo_runner(
        &plan,
        &["run"],
        &[
            ("PROJECT_ID", "demo-project"),
            ("APIGEE_HOST", ""),
            ("APIGEE_ENV", "eval"),
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(text(&output.stderr).contains("APIGEE_HOST"));
    assert!(plan.trace().is_empty());
}

#[test]
fn whitespace_value_satisfies_the_gate() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    let output = demo_runner(
        &plan,
        &["check"],
        &[
            ("PROJECT_ID", "demo-project"),
            ("APIGEE_HOST", " "),
            ("APIGEE_ENV", "eval"),
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(!text(&output.stderr).contains("APIGEE_HOST"));
}

#[test]
fn unwritable_log_dir_does_not_fail_a_passing_step() {
    let plan = StubPlan::new(&REQUIRED, &["one"], &[]).expect("plan");
    plan.configure(|cfg| cfg.log_dir = Some(PathBuf::from("logs")))
        .expect("configure");
    fs::write(plan.path().join("logs"), "not a directory").expect("write file");

    let output = demo_runner(&plan, &["run"], &all_vars());

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", text(&output.stderr));
    assert_eq!(plan.trace(), vec!["one"]);
    assert!(!text(&output.stderr).contains("could not be started"));
    assert!(text(&output.stdout).contains("All 1 steps completed successfully."));
}

#[test]
fn step_logs_are_written_under_log_dir() {
    let plan = StubPlan::new(&REQUIRED, &["one", "two"], &[]).expect("plan");
    plan.configure(|cfg| cfg.log_dir = Some(PathBuf::from("logs")))
        .expect("configure");

    let output = demo_runner(&plan, &["run"], &all_vars());

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(plan.path().join("logs/1-one.log").exists());
    assert!(plan.path().join("logs/2-two.log").exists());
}

#[test]
fn unsafe_step_id_is_rejected_before_anything_runs() {
    let plan = StubPlan::new(&REQUIRED, &["one"], &[]).expect("plan");
    let contents = fs::read_to_string(plan.config_path()).expect("read config");
    fs::write(plan.config_path(), contents.replace("id = \"one\"", "id = \"../../x\""))
        .expect("rewrite config");

    let output = demo_runner(&plan, &["run"], &all_vars());

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(text(&output.stderr).contains("../../x"));
    assert!(plan.trace().is_empty());
}

#[test]
fn explicit_missing_config_is_an_error() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    let output = Command::new(env!("CARGO_BIN_EXE_demo-runner"))
        .current_dir(plan.path())
        .env_clear()
        .args(["--config", "typo.toml", "run"])
        .envs(all_vars())
        .output()
        .expect("run demo-runner");

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(text(&output.stderr).contains("typo.toml does not exist"));
    assert!(!text(&output.stdout).contains("Step "));
    assert!(plan.trace().is_empty());
}

#[test]
fn render_failure_stops_the_sequence() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &["render"]).expect("plan");
    let output = demo_runner(&plan, &["run"], &all_vars());

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert_eq!(plan.trace(), vec!["export", "import", "render"]);

    let stdout = text(&output.stdout);
    assert!(stdout.contains("Step 1/6: export label (sh)"), "{stdout}");
    assert!(stdout.contains("Step 2/6: import label (sh)"), "{stdout}");
    assert!(stdout.contains("Step 3/6: render label (sh)"), "{stdout}");
    assert!(!stdout.contains("Step 4/6"), "{stdout}");
    assert!(!stdout.contains("completed successfully"), "{stdout}");

    let stderr = text(&output.stderr);
    assert!(
        stderr.contains("error: step 3/6 \"render label\" failed: sh exited with status 1"),
        "{stderr}"
    );
}

#[test]
fn all_steps_succeed_in_order() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");
    let output = demo_runner(&plan, &[], &all_vars());

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(plan.trace(), DEMO_IDS.to_vec());
    assert!(text(&output.stdout).contains("All 6 steps completed successfully."));
}

#[test]
fn check_only_runs_the_gate() {
    let plan = StubPlan::new(&REQUIRED, &DEMO_IDS, &[]).expect("plan");

    let ok = demo_runner(&plan, &["check"], &all_vars());
    assert_eq!(ok.status.code(), Some(exit_codes::OK));
    assert!(text(&ok.stdout).contains("All 3 required environment variables are set."));

    let missing = demo_runner(&plan, &["check"], &[]);
    assert_eq!(missing.status.code(), Some(exit_codes::FAILURE));
    assert!(plan.trace().is_empty());
}
