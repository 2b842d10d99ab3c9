//! Diagnostic logging to stderr. Stdout is reserved for the preview JSON.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

const DEFAULT_TARGETS: &[&str] = &["llm_pricing_core", "add_model"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain lines, no timestamps.
    #[default]
    Human,
    /// Terse single-line events with targets.
    Compact,
    /// One JSON object per event.
    Json,
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    DEFAULT_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init(verbose: bool, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // try_init: a second call (tests) keeps the first subscriber.
    match format {
        LogFormat::Human => builder.with_target(false).without_time().try_init().ok(),
        LogFormat::Compact => builder.compact().with_target(true).try_init().ok(),
        LogFormat::Json => builder.json().try_init().ok(),
    };
}
