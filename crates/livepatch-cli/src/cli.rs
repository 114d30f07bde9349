use clap::{Parser, Subcommand, ValueEnum};
use livepatch_config::LogFormat;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Log output format options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

#[derive(Parser)]
#[command(name = "livepatch")]
#[command(about = "livepatch - inspect how template updates are encoded")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG, then the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (overrides config file)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Config file path (defaults to ~/.config/livepatch/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template against two data files and print the fragments
    Diff {
        /// Template file
        template: PathBuf,

        /// JSON data for the rendering the client currently shows
        old: PathBuf,

        /// JSON data for the next rendering
        new: PathBuf,

        /// Ask for a specific strategy (1-4); unsafe requests are refused
        #[arg(short = 's', long, value_parser = clap::value_parser!(u8).range(1..=4))]
        strategy: Option<u8>,

        /// Include generator and analyzer metrics in the output
        #[arg(long)]
        metrics: bool,
    },

    /// Render a template against a sequence of data files as tree updates
    Tree {
        /// Template file
        template: PathBuf,

        /// JSON data files, one tree update per file
        #[arg(required = true)]
        data: Vec<PathBuf>,

        /// Fragment id the updates are tracked under
        #[arg(long, default_value = "main")]
        fragment: String,

        /// Also print the HTML a client reconstructs from each update
        #[arg(long)]
        html: bool,
    },

    /// Classify the change between two HTML files
    Classify {
        /// HTML the client currently shows
        old: PathBuf,

        /// Next HTML
        new: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the default config file location
    Path,
}
