//! Operator-facing output: banners, diagnostics and the completion message.
//!
//! This is product output and is always written. Developer diagnostics go
//! through `tracing` (see [`crate::logging`]) and are controlled by `RUST_LOG`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::gate::GateReport;
use crate::core::types::{ResolvedStep, StepFailure};

const RULE: &str = "================================================================";

/// Sink for everything the operator sees while a plan runs.
pub trait Reporter {
    /// A required variable is unset or empty. Called once per missing name.
    fn missing_variable(&mut self, name: &str) -> Result<()>;
    /// The gate finished; `report` says whether it passed.
    fn gate_finished(&mut self, report: &GateReport) -> Result<()>;
    /// Step `index` of `total` (1-based) is about to run.
    fn banner(&mut self, index: usize, total: usize, step: &ResolvedStep) -> Result<()>;
    /// A step succeeded but its declared artifact is not on disk.
    fn artifact_missing(&mut self, step: &ResolvedStep, path: &Path) -> Result<()>;
    fn step_failed(&mut self, failure: &StepFailure) -> Result<()>;
    /// Every step succeeded.
    fn completed(&mut self, total: usize) -> Result<()>;
}

/// Writes banners and the completion message to `out`, diagnostics to `err`.
pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleReporter<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn missing_variable(&mut self, name: &str) -> Result<()> {
        writeln!(self.err, "error: required environment variable {name} is not set")
            .context("write diagnostic")
    }

    fn gate_finished(&mut self, report: &GateReport) -> Result<()> {
        if report.is_satisfied() {
            return Ok(());
        }
        writeln!(
            self.err,
            "error: {} of {} required environment variables missing: {}",
            report.missing().len(),
            report.checked(),
            report.missing().join(", ")
        )
        .context("write diagnostic")
    }

    fn banner(&mut self, index: usize, total: usize, step: &ResolvedStep) -> Result<()> {
        writeln!(self.out, "{RULE}").context("write banner")?;
        writeln!(
            self.out,
            "Step {index}/{total}: {} ({})",
            step.label, step.program
        )
        .context("write banner")?;
        writeln!(self.out, "$ {}", step.command_line()).context("write banner")?;
        writeln!(self.out, "{RULE}").context("write banner")?;
        self.out.flush().context("flush banner")
    }

    fn artifact_missing(&mut self, step: &ResolvedStep, path: &Path) -> Result<()> {
        writeln!(
            self.err,
            "warning: step \"{}\" succeeded but {} does not exist",
            step.label,
            path.display()
        )
        .context("write diagnostic")
    }

    fn step_failed(&mut self, failure: &StepFailure) -> Result<()> {
        writeln!(self.err, "error: {failure}").context("write diagnostic")
    }

    fn completed(&mut self, total: usize) -> Result<()> {
        writeln!(self.out, "All {total} steps completed successfully.").context("write summary")
    }
}
