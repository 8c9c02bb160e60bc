//! `${NAME}` placeholder handling for step arguments and paths.
//!
//! Only simple substitution is supported: no defaults, no nesting, no escapes.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::env::EnvSnapshot;
use crate::core::types::{ResolvedStep, Step};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Variable names referenced by `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Variable names referenced anywhere in `step` (args, workdir, artifact).
pub fn step_placeholders(step: &Step) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let fields = std::iter::once(step.program.as_str())
        .chain(step.args.iter().map(String::as_str))
        .chain(step.workdir.as_deref())
        .chain(step.artifact.as_deref());
    for field in fields {
        for name in placeholders(field) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Replace every placeholder in `text`. Returns the first unresolved name on failure.
pub fn substitute(text: &str, env: &EnvSnapshot) -> Result<String, String> {
    let mut unresolved: Option<String> = None;
    let out = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| match env.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => {
            if unresolved.is_none() {
                unresolved = Some(caps[1].to_string());
            }
            String::new()
        }
    });
    match unresolved {
        Some(name) => Err(name),
        None => Ok(out.into_owned()),
    }
}

/// Resolve every field of `step` against `env`.
pub fn resolve_step(step: &Step, env: &EnvSnapshot) -> Result<ResolvedStep, String> {
    let args = step
        .args
        .iter()
        .map(|arg| substitute(arg, env))
        .collect::<Result<Vec<_>, _>>()?;
    let workdir = step
        .workdir
        .as_deref()
        .map(|w| substitute(w, env))
        .transpose()?;
    let artifact = step
        .artifact
        .as_deref()
        .map(|a| substitute(a, env))
        .transpose()?;
    Ok(ResolvedStep {
        id: step.id.clone(),
        label: step.label.clone(),
        program: substitute(&step.program, env)?,
        args,
        workdir,
        artifact,
    })
}
