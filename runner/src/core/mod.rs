//! Deterministic, pure logic shared by the gate and the sequencer.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data (the plan and an environment snapshot) and return deterministic outputs.

pub mod env;
pub mod gate;
pub mod placeholder;
pub mod plan;
pub mod types;
