//! Orchestration for the precondition gate.

use anyhow::Result;
use tracing::{debug, info};

use crate::core::env::EnvSnapshot;
use crate::core::gate::{GateReport, check_required};
use crate::report::Reporter;

/// Check `required` against `env` and report every missing name.
///
/// The caller decides what to do with an unsatisfied report; no step may run
/// when `is_satisfied()` is false.
pub fn run_gate<R: Reporter>(
    required: &[String],
    env: &EnvSnapshot,
    reporter: &mut R,
) -> Result<GateReport> {
    debug!(required = required.len(), "checking required environment");
    let report = check_required(required, env);
    for name in report.missing() {
        reporter.missing_variable(name)?;
    }
    reporter.gate_finished(&report)?;
    if report.is_satisfied() {
        info!(checked = report.checked(), "required environment present");
    } else {
        info!(missing = ?report.missing(), "required environment incomplete");
    }
    Ok(report)
}
