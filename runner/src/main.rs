//! Guarded demo runner.
//!
//! Verifies the required environment, then walks through the proxy generator
//! and deployment tooling one step at a time. The plan comes from
//! `demo-runner.toml` when present, otherwise the built-in demonstration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use demo_runner::core::types::Step;
use demo_runner::exit_codes;
use demo_runner::gate::run_gate;
use demo_runner::io::config::{DEFAULT_CONFIG_FILE, PlanConfig, load_config, write_config};
use demo_runner::io::env::capture_process_env;
use demo_runner::io::executor::SystemExecutor;
use demo_runner::logging;
use demo_runner::report::ConsoleReporter;
use demo_runner::sequence::{SequenceOptions, run_sequence};

#[derive(Parser)]
#[command(
    name = "demo-runner",
    version,
    about = "Check required environment, then run demo steps in order"
)]
struct Cli {
    /// Plan file; must exist when given. Without it, `demo-runner.toml` is used if
    /// present, otherwise the built-in plan.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check the environment, then run every step (default).
    Run,
    /// Only check that every required environment variable is set.
    Check,
    /// Print the plan without running anything.
    List {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write the built-in plan to the config path.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run(&plan_path(explicit)?),
        Command::Check => cmd_check(&plan_path(explicit)?),
        Command::List { json } => cmd_list(&plan_path(explicit)?, json),
        Command::Init { force } => cmd_init(&init_path(explicit), force),
    }
}

/// Plan file to read. An explicitly given path must exist; the default may be absent.
fn plan_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if !path.exists() => bail!("config {} does not exist", path.display()),
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(PathBuf::from(DEFAULT_CONFIG_FILE)),
    }
}

fn init_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf)
}

fn cmd_run(config_path: &Path) -> Result<i32> {
    let cfg = load_anchored(config_path)?;
    let env = capture_process_env();
    let mut reporter = ConsoleReporter::stdio();

    let report = run_gate(&cfg.required_env, &env, &mut reporter)?;
    if !report.is_satisfied() {
        return Ok(exit_codes::FAILURE);
    }

    let outcome = run_sequence(
        &cfg.steps,
        &env,
        &SystemExecutor::default(),
        &mut reporter,
        &SequenceOptions::from_config(&cfg),
    )?;
    Ok(outcome.exit_code())
}

fn cmd_check(config_path: &Path) -> Result<i32> {
    let cfg = load_anchored(config_path)?;
    let env = capture_process_env();
    let mut reporter = ConsoleReporter::stdio();

    let report = run_gate(&cfg.required_env, &env, &mut reporter)?;
    if !report.is_satisfied() {
        return Ok(exit_codes::FAILURE);
    }
    println!(
        "All {} required environment variables are set.",
        report.checked()
    );
    Ok(exit_codes::OK)
}

/// Plan as printed by `list --json`.
#[derive(Serialize)]
struct PlanListing<'a> {
    required_env: &'a [String],
    steps: &'a [Step],
}

fn cmd_list(config_path: &Path, json: bool) -> Result<i32> {
    let cfg = load_config(config_path)?;
    if json {
        let listing = PlanListing {
            required_env: &cfg.required_env,
            steps: &cfg.steps,
        };
        let payload = serde_json::to_string_pretty(&listing).context("serialize plan json")?;
        println!("{payload}");
        return Ok(exit_codes::OK);
    }

    println!("required: {}", cfg.required_env.join(", "));
    for (offset, step) in cfg.steps.iter().enumerate() {
        println!("{}. [{}] {}", offset + 1, step.id, step.label);
        println!("   $ {}", step.command_line());
    }
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &PlanConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

/// Load the plan and resolve its relative paths against the config file's directory.
fn load_anchored(config_path: &Path) -> Result<PlanConfig> {
    let cfg = load_config(config_path)?;
    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let base = fs::canonicalize(&base).with_context(|| format!("resolve {}", base.display()))?;
    Ok(cfg.anchored(&base))
}
