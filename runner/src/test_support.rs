//! Test-only helpers: scripted executors, recording reporters and plan builders.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::core::gate::GateReport;
use crate::core::types::{ExitState, ResolvedStep, RunResult, Step, StepFailure};
use crate::io::config::{DEFAULT_CONFIG_FILE, PlanConfig, load_config, write_config};
use crate::io::executor::{StepExecutor, StepRequest};
use crate::report::Reporter;

/// Owned list of names from string literals.
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Step that runs `sh -c <script>`.
pub fn sh_step(id: &str, script: &str) -> Step {
    Step {
        id: id.to_string(),
        label: format!("{id} label"),
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        workdir: None,
        artifact: None,
    }
}

enum Scripted {
    Exit(i32),
    Terminated,
    Error(String),
}

/// Executor that returns predetermined results keyed by step id.
///
/// Steps without a script succeed. Every call is recorded in order.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: HashMap<String, Scripted>,
    calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedExecutor {
    /// Make step `id` exit with `code`.
    pub fn fail(mut self, id: &str, code: i32) -> Self {
        self.scripts.insert(id.to_string(), Scripted::Exit(code));
        self
    }

    /// Make step `id` end without an exit code, as if killed by a signal.
    pub fn terminate(mut self, id: &str) -> Self {
        self.scripts.insert(id.to_string(), Scripted::Terminated);
        self
    }

    /// Make step `id` fail to run at all.
    pub fn error(mut self, id: &str, message: &str) -> Self {
        self.scripts
            .insert(id.to_string(), Scripted::Error(message.to_string()));
        self
    }

    /// Ids of executed steps, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Arguments of the most recent call.
    pub fn last_args(&self) -> Option<Vec<String>> {
        self.calls.borrow().last().map(|(_, args)| args.clone())
    }
}

impl StepExecutor for ScriptedExecutor {
    fn execute(&self, request: &StepRequest<'_>) -> Result<RunResult> {
        self.calls
            .borrow_mut()
            .push((request.step.id.clone(), request.step.args.clone()));
        match self.scripts.get(&request.step.id) {
            None => Ok(RunResult::with_code(0)),
            Some(Scripted::Exit(code)) => Ok(RunResult::with_code(*code)),
            Some(Scripted::Terminated) => Ok(RunResult {
                exit: ExitState::Terminated,
                ..RunResult::with_code(0)
            }),
            Some(Scripted::Error(message)) => Err(anyhow!("{message}")),
        }
    }
}

/// What a [`RecordingReporter`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reported {
    Missing(String),
    GateFinished { satisfied: bool },
    Banner { index: usize, total: usize, id: String },
    ArtifactMissing(String),
    StepFailed(StepFailure),
    Completed(usize),
}

/// Reporter that records events instead of printing them.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Reported>,
}

impl RecordingReporter {
    /// Step ids whose banner was shown, in order.
    pub fn banners(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Reported::Banner { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn missing_variable(&mut self, name: &str) -> Result<()> {
        self.events.push(Reported::Missing(name.to_string()));
        Ok(())
    }

    fn gate_finished(&mut self, report: &GateReport) -> Result<()> {
        self.events.push(Reported::GateFinished {
            satisfied: report.is_satisfied(),
        });
        Ok(())
    }

    fn banner(&mut self, index: usize, total: usize, step: &ResolvedStep) -> Result<()> {
        self.events.push(Reported::Banner {
            index,
            total,
            id: step.id.clone(),
        });
        Ok(())
    }

    fn artifact_missing(&mut self, step: &ResolvedStep, _path: &Path) -> Result<()> {
        self.events.push(Reported::ArtifactMissing(step.id.clone()));
        Ok(())
    }

    fn step_failed(&mut self, failure: &StepFailure) -> Result<()> {
        self.events.push(Reported::StepFailed(failure.clone()));
        Ok(())
    }

    fn completed(&mut self, total: usize) -> Result<()> {
        self.events.push(Reported::Completed(total));
        Ok(())
    }
}

/// Scratch directory holding a plan file whose steps are `sh` stubs.
///
/// Each stub appends its id to `trace.log`, so tests can see which steps ran
/// and in what order.
pub struct StubPlan {
    dir: tempfile::TempDir,
}

impl StubPlan {
    /// Write a plan with one stub per id; ids listed in `failing` exit with status 1.
    pub fn new(required: &[&str], ids: &[&str], failing: &[&str]) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let steps = ids
            .iter()
            .map(|id| {
                let exit = if failing.contains(id) { 1 } else { 0 };
                sh_step(id, &format!("echo {id} >> trace.log; exit {exit}"))
            })
            .collect();
        let cfg = PlanConfig {
            required_env: names(required),
            steps,
            ..PlanConfig::default()
        };
        write_config(&dir.path().join(DEFAULT_CONFIG_FILE), &cfg)?;
        Ok(Self { dir })
    }

    /// Rewrite the plan file after adjusting its config.
    pub fn configure(&self, edit: impl FnOnce(&mut PlanConfig)) -> Result<()> {
        let path = self.config_path();
        let mut cfg = load_config(&path)?;
        edit(&mut cfg);
        write_config(&path, &cfg)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(DEFAULT_CONFIG_FILE)
    }

    /// Ids of stubs that ran, in order. Empty when nothing ran.
    pub fn trace(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("trace.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
