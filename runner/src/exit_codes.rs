//! Stable exit codes for demo-runner commands.

/// Every step succeeded (or, for `check`, every required variable is set).
pub const OK: i32 = 0;
/// A required variable is missing, a step failed, or the runner itself failed.
pub const FAILURE: i32 = 1;
