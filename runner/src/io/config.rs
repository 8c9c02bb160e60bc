//! Plan configuration stored in `demo-runner.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::placeholder::step_placeholders;
use crate::core::plan::{default_required_env, default_steps};
use crate::core::types::Step;

pub const DEFAULT_CONFIG_FILE: &str = "demo-runner.toml";

/// Step ids end up in log file names, so they are restricted to a safe alphabet.
static STEP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Plan configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to the built-in
/// demonstration plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlanConfig {
    /// Environment variables that must be set and non-empty before any step runs.
    pub required_env: Vec<String>,

    /// Base working directory for every step, relative to the config file's directory.
    pub workdir: PathBuf,

    /// Keep at most this many bytes of each step's stdout and stderr.
    pub output_limit_bytes: usize,

    /// When set, write each executed step's captured output to `<log_dir>/<n>-<id>.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    pub steps: Vec<Step>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            required_env: default_required_env(),
            workdir: PathBuf::from("."),
            output_limit_bytes: 1_000_000,
            log_dir: None,
            steps: default_steps(),
        }
    }
}

impl PlanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        let mut required = HashSet::new();
        for name in &self.required_env {
            if name.trim().is_empty() {
                bail!("required_env entries must be non-empty");
            }
            if !required.insert(name.as_str()) {
                bail!("required_env lists {name} more than once");
            }
        }
        if self.steps.is_empty() {
            return Err(anyhow!("steps must be a non-empty array"));
        }
        let mut ids = HashSet::new();
        for step in &self.steps {
            if !STEP_ID_RE.is_match(&step.id) {
                bail!(
                    "step id {:?} must be non-empty and use only letters, digits, '-' or '_'",
                    step.id
                );
            }
            if !ids.insert(step.id.as_str()) {
                bail!("duplicate step id {}", step.id);
            }
            if step.program.trim().is_empty() {
                bail!("step {} has an empty program", step.id);
            }
            for name in step_placeholders(step) {
                if !required.contains(name.as_str()) {
                    bail!(
                        "step {} references ${{{name}}} which is not listed in required_env",
                        step.id
                    );
                }
            }
        }
        Ok(())
    }

    /// Resolve relative `workdir` and `log_dir` against `base`.
    pub fn anchored(mut self, base: &Path) -> Self {
        if self.workdir.is_relative() {
            self.workdir = base.join(&self.workdir);
        }
        if let Some(log_dir) = self.log_dir.take() {
            self.log_dir = Some(if log_dir.is_relative() {
                base.join(log_dir)
            } else {
                log_dir
            });
        }
        self
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PlanConfig::default()`.
pub fn load_config(path: &Path) -> Result<PlanConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using built-in plan");
        let cfg = PlanConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PlanConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), steps = cfg.steps.len(), "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PlanConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
