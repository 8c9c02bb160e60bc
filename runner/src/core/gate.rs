//! Precondition checks over the environment snapshot.
//!
//! The check never stops at the first problem: every required name is examined
//! and all missing ones are collected into a single report.

use crate::core::env::EnvSnapshot;

/// Accumulated result of checking the required variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    checked: usize,
    missing: Vec<String>,
}

impl GateReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing names, in declaration order, without duplicates.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn checked(&self) -> usize {
        self.checked
    }
}

/// Check that every name in `required` is present and non-empty in `env`.
pub fn check_required(required: &[String], env: &EnvSnapshot) -> GateReport {
    let mut missing: Vec<String> = Vec::new();
    for name in required {
        if env.non_empty(name).is_none() && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    GateReport {
        checked: required.len(),
        missing,
    }
}
