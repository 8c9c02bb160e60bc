//! Developer tracing for the runner, written to stderr.
//!
//! Tracing output and operator output are separate:
//!
//! - `tracing` events (this module) are diagnostics for whoever is debugging
//!   `demo-runner` itself. `RUST_LOG` controls them, and they stay quiet below `warn`.
//! - Banners, missing-variable messages and step failures go through
//!   [`crate::report::Reporter`] and are printed regardless of `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=demo_runner=debug demo-runner check
//! RUST_LOG=demo_runner::io::process=trace demo-runner --config plan.toml run
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the stderr subscriber, filtered by `RUST_LOG`.
pub fn init() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(filter_from(directives.as_deref()))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Build the filter from `RUST_LOG`-style directives.
///
/// A missing, empty or unparsable value falls back to `warn`.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
