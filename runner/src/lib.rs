//! Guarded command-sequencing runner.
//!
//! Checks that a fixed set of environment variables is present, then runs an
//! ordered list of external tools one at a time, stopping at the first failure.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (plan, gate check, placeholders).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (environment capture, config files,
//!   process execution). Isolated behind traits so tests can script them.
//!
//! Orchestration modules ([`gate`], [`sequence`]) combine the two and talk to
//! the operator through a [`report::Reporter`].

pub mod core;
pub mod exit_codes;
pub mod gate;
pub mod io;
pub mod logging;
pub mod report;
pub mod sequence;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
