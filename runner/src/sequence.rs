//! Orchestration for running the plan's steps in order.
//!
//! Steps run one at a time in declaration order; each child must exit before
//! the next one starts. The first failure ends the sequence.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::core::env::EnvSnapshot;
use crate::core::placeholder::resolve_step;
use crate::core::types::{ExitState, FailureReason, ResolvedStep, Step, StepFailure};
use crate::exit_codes;
use crate::io::config::PlanConfig;
use crate::io::executor::{StepExecutor, StepRequest};
use crate::report::Reporter;

/// Execution settings shared by every step.
#[derive(Debug, Clone)]
pub struct SequenceOptions {
    /// Base working directory; a step's own `workdir` is joined onto it.
    pub workdir: PathBuf,
    pub output_limit_bytes: usize,
    pub log_dir: Option<PathBuf>,
}

impl SequenceOptions {
    pub fn from_config(cfg: &PlanConfig) -> Self {
        Self {
            workdir: cfg.workdir.clone(),
            output_limit_bytes: cfg.output_limit_bytes,
            log_dir: cfg.log_dir.clone(),
        }
    }
}

/// Result of running a whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every step exited with status zero.
    Completed { steps: usize },
    /// The sequence stopped at this step; nothing after it ran.
    Failed(StepFailure),
}

impl SequenceOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            SequenceOutcome::Completed { .. } => exit_codes::OK,
            SequenceOutcome::Failed(_) => exit_codes::FAILURE,
        }
    }
}

/// Run `steps` in order, stopping at the first failure.
///
/// `Err` is reserved for reporter failures; a step that cannot be started or
/// exits non-zero yields [`SequenceOutcome::Failed`].
pub fn run_sequence<E: StepExecutor, R: Reporter>(
    steps: &[Step],
    env: &EnvSnapshot,
    executor: &E,
    reporter: &mut R,
    options: &SequenceOptions,
) -> Result<SequenceOutcome> {
    let total = steps.len();
    for (offset, step) in steps.iter().enumerate() {
        let index = offset + 1;
        let (resolved, unresolved) = match resolve_step(step, env) {
            Ok(resolved) => (resolved, None),
            Err(name) => (verbatim(step), Some(name)),
        };
        reporter.banner(index, total, &resolved)?;

        if let Some(name) = unresolved {
            let failure =
                step_failure(index, total, &resolved, FailureReason::Unresolved(name));
            reporter.step_failed(&failure)?;
            return Ok(SequenceOutcome::Failed(failure));
        }

        let workdir = match &resolved.workdir {
            Some(dir) => options.workdir.join(dir),
            None => options.workdir.clone(),
        };
        let request = StepRequest {
            step: &resolved,
            workdir,
            env,
            output_limit_bytes: options.output_limit_bytes,
            log_path: options
                .log_dir
                .as_ref()
                .map(|dir| dir.join(format!("{index}-{}.log", resolved.id))),
        };

        debug!(index, total, step = %resolved.id, "executing step");
        let reason = match executor.execute(&request) {
            Ok(result) if result.success() => None,
            Ok(result) => Some(match result.exit {
                ExitState::Code(code) => FailureReason::ExitCode(code),
                ExitState::Terminated => FailureReason::Terminated,
            }),
            Err(err) => Some(FailureReason::Spawn(format!("{err:#}"))),
        };

        if let Some(reason) = reason {
            let failure = step_failure(index, total, &resolved, reason);
            info!(step = %resolved.id, reason = %failure.reason, "sequence stopped");
            reporter.step_failed(&failure)?;
            return Ok(SequenceOutcome::Failed(failure));
        }

        if let Some(path) = request.artifact_path()
            && !path.exists()
        {
            reporter.artifact_missing(&resolved, &path)?;
        }
    }

    info!(steps = total, "sequence completed");
    reporter.completed(total)?;
    Ok(SequenceOutcome::Completed { steps: total })
}

fn step_failure(
    index: usize,
    total: usize,
    step: &ResolvedStep,
    reason: FailureReason,
) -> StepFailure {
    StepFailure {
        index,
        total,
        id: step.id.clone(),
        label: step.label.clone(),
        program: step.program.clone(),
        reason,
    }
}

/// The step as declared, placeholders left in place.
fn verbatim(step: &Step) -> ResolvedStep {
    ResolvedStep {
        id: step.id.clone(),
        label: step.label.clone(),
        program: step.program.clone(),
        args: step.args.clone(),
        workdir: step.workdir.clone(),
        artifact: step.artifact.clone(),
    }
}
