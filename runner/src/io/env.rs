//! Capture of the process environment.

use tracing::warn;

use crate::core::env::EnvSnapshot;

/// Snapshot the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped; they can never
/// satisfy a requirement or a placeholder, and children still inherit them
/// because the snapshot is layered over the inherited environment.
pub fn capture_process_env() -> EnvSnapshot {
    let mut env = EnvSnapshot::new();
    for (key, value) in std::env::vars_os() {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => env.set(key, value),
            (Ok(key), Err(_)) => warn!(name = %key, "skipping non-UTF-8 environment value"),
            (Err(key), _) => warn!(name = ?key, "skipping non-UTF-8 environment name"),
        }
    }
    env
}
