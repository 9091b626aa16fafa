//! Structured logging setup.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Fallback directive when the configured level does not parse.
const DEFAULT_DIRECTIVE: &str = "info";

/// Build the event filter for a configured level.
///
/// `RUST_LOG` wins when set, so operators can raise verbosity per module
/// without touching the config file.
pub fn env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Build a subscriber writing to `writer` in the configured format.
///
/// `ansi` enables colour escapes in the pretty format; pass `false` for
/// anything that is not a terminal.
pub fn build_subscriber<W>(
    config: &LoggingConfig,
    writer: W,
    ansi: bool,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.level))
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    match config.format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Pretty => Box::new(builder.finish()),
    }
}

/// Install the process-wide subscriber writing to stdout.
///
/// Colour is only used when stdout is a terminal. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let ansi = std::io::stdout().is_terminal();
    tracing::subscriber::set_global_default(build_subscriber(config, std::io::stdout, ansi))
        .context("Failed to install tracing subscriber")
}
