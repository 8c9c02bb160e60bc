//! Executor abstraction for step invocation.
//!
//! The [`StepExecutor`] trait decouples sequencing from actually spawning the
//! external tools. Tests use scripted executors that return predetermined exit
//! codes without spawning processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::env::EnvSnapshot;
use crate::core::types::{ExitState, ResolvedStep, RunResult};
use crate::io::process::{CommandOutput, Echo, run_command};

/// Parameters for one step invocation.
#[derive(Debug, Clone)]
pub struct StepRequest<'a> {
    pub step: &'a ResolvedStep,
    /// Working directory for the child process.
    pub workdir: PathBuf,
    /// Environment passed through to the child.
    pub env: &'a EnvSnapshot,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
    /// Where to write the captured output, if anywhere.
    pub log_path: Option<PathBuf>,
}

impl StepRequest<'_> {
    /// Absolute location of the step's expected artifact, if it declares one.
    pub fn artifact_path(&self) -> Option<PathBuf> {
        self.step
            .artifact
            .as_deref()
            .map(|artifact| self.workdir.join(artifact))
    }
}

/// Abstraction over how a step's external tool is run.
pub trait StepExecutor {
    /// Run the step and wait for it to exit.
    ///
    /// A non-zero exit is reported through the returned [`RunResult`]; `Err` means the
    /// tool could not be run at all.
    fn execute(&self, request: &StepRequest<'_>) -> Result<RunResult>;
}

/// Executor that spawns the step's program as a real child process.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor {
    pub echo: Echo,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self {
            echo: Echo::Terminal,
        }
    }
}

impl StepExecutor for SystemExecutor {
    #[instrument(skip_all, fields(step = %request.step.id, program = %request.step.program))]
    fn execute(&self, request: &StepRequest<'_>) -> Result<RunResult> {
        info!(workdir = %request.workdir.display(), "starting step");

        if let Some(parent) = request.artifact_path().as_deref().and_then(Path::parent) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }

        let mut cmd = Command::new(&request.step.program);
        cmd.args(&request.step.args)
            .current_dir(&request.workdir)
            .envs(request.env.iter());

        let output = run_command(cmd, request.output_limit_bytes, self.echo)
            .with_context(|| format!("run {}", request.step.program))?;

        // The child has already exited; a failed log write never changes its outcome.
        if let Some(log_path) = &request.log_path
            && let Err(err) = write_step_log(log_path, &output, request.output_limit_bytes)
        {
            warn!(
                path = %log_path.display(),
                err = %format!("{err:#}"),
                "failed to write step log"
            );
        }

        let result = RunResult {
            exit: match output.status.code() {
                Some(code) => ExitState::Code(code),
                None => ExitState::Terminated,
            },
            stdout: output.stdout,
            stderr: output.stderr,
            stdout_truncated: output.stdout_truncated,
            stderr_truncated: output.stderr_truncated,
        };

        if result.success() {
            debug!("step completed successfully");
        } else {
            info!(exit = ?result.exit, "step failed");
        }
        Ok(result)
    }
}

fn write_step_log(path: &Path, output: &CommandOutput, output_limit: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create step log dir {}", parent.display()))?;
    }
    let mut buf = String::new();
    buf.push_str(&format!("=== exit: {:?} ===\n", output.status.code()));
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    if output.stdout_truncated > 0 {
        buf.push_str(&format!(
            "\n[stdout truncated {} bytes]\n",
            output.stdout_truncated
        ));
    }
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    if output.stderr_truncated > 0 {
        buf.push_str(&format!(
            "\n[stderr truncated {} bytes]\n",
            output.stderr_truncated
        ));
    }
    debug!(path = %path.display(), bytes = buf.len(), output_limit, "writing step log");
    fs::write(path, buf).with_context(|| format!("write step log {}", path.display()))?;
    Ok(())
}
