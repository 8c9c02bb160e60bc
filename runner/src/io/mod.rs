//! I/O helpers: environment capture, config files and child processes.

pub mod config;
pub mod env;
pub mod executor;
pub mod process;
