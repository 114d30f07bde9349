//! Tracing subscriber setup
//!
//! Filter precedence: `--log-level` / `-v`, then `RUST_LOG`, then the config
//! file's `[logging] level`. Logs go to stderr so stdout stays pure JSON.

use livepatch_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Build the filter for this invocation
pub fn env_filter(cli_level: Option<LogLevel>, verbose: bool, config: &LoggingConfig) -> EnvFilter {
    let cli_level = cli_level.or(verbose.then_some(LogLevel::Debug));
    if let Some(level) = cli_level {
        return EnvFilter::new(LevelFilter::from(level).to_string());
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
pub fn init(filter: EnvFilter, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
