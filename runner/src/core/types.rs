//! Shared deterministic types for the gate and the sequencer.
//!
//! Steps are declared once (built-in plan or TOML config) and never mutated.
//! Run results are produced by an executor and consumed immediately.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One external-tool invocation in the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Short stable identifier (used for log file names and `list` output).
    pub id: String,
    /// Human-readable label printed in the banner.
    pub label: String,
    /// Program name, resolved through `PATH` by the OS.
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the child, relative to the plan workdir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    /// Path the tool is expected to produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl Step {
    /// Unresolved command line, for display only.
    pub fn command_line(&self) -> String {
        render_command_line(&self.program, &self.args)
    }
}

/// A step with every `${NAME}` placeholder replaced from the environment snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub id: String,
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<String>,
    pub artifact: Option<String>,
}

impl ResolvedStep {
    pub fn command_line(&self) -> String {
        render_command_line(&self.program, &self.args)
    }
}

fn render_command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('\'');
            line.push_str(arg);
            line.push('\'');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited normally with this code.
    Code(i32),
    /// Terminated without an exit code (e.g. killed by a signal).
    Terminated,
}

/// Outcome of running one step's child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub exit: ExitState,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes of stdout dropped beyond the capture limit.
    pub stdout_truncated: usize,
    /// Bytes of stderr dropped beyond the capture limit.
    pub stderr_truncated: usize,
}

impl RunResult {
    /// Result with exit code and no captured output.
    pub fn with_code(code: i32) -> Self {
        Self {
            exit: ExitState::Code(code),
            stdout: Vec::new(),
            stderr: Vec::new(),
            stdout_truncated: 0,
            stderr_truncated: 0,
        }
    }

    pub fn success(&self) -> bool {
        self.exit == ExitState::Code(0)
    }
}

/// Why a step was classified as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The tool exited with a non-zero code.
    ExitCode(i32),
    /// The tool was terminated without an exit code.
    Terminated,
    /// The tool could not be started (not installed, not executable, bad workdir).
    Spawn(String),
    /// A placeholder could not be resolved against the environment snapshot.
    Unresolved(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExitCode(code) => write!(f, "exited with status {code}"),
            FailureReason::Terminated => write!(f, "was terminated without an exit status"),
            FailureReason::Spawn(err) => write!(f, "could not be started: {err}"),
            FailureReason::Unresolved(name) => {
                write!(f, "references unset variable {name}")
            }
        }
    }
}

/// The first failing step of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// 1-based position in the sequence.
    pub index: usize,
    pub total: usize,
    pub id: String,
    pub label: String,
    pub program: String,
    pub reason: FailureReason,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}/{} \"{}\" failed: {} {}",
            self.index, self.total, self.label, self.program, self.reason
        )
    }
}
