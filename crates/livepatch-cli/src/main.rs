use anyhow::{Context, Result};
use clap::Parser;
use livepatch_config::LivepatchConfig;
use serde_json::Value;
use tracing::debug;

use livepatch_cli::{
    cli::{Cli, Commands},
    commands, logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = LivepatchConfig::from_file(path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => LivepatchConfig::load(None)?,
    };

    let format = cli.log_format.map_or(config.logging.format, Into::into);
    logging::init(logging::env_filter(cli.log_level, cli.verbose, &config.logging), format);
    debug!(?config, "configuration loaded");

    let output = match &cli.command {
        Commands::Diff {
            template,
            old,
            new,
            strategy,
            metrics,
        } => commands::diff::execute(&config, template, old, new, *strategy, *metrics)?,
        Commands::Tree {
            template,
            data,
            fragment,
            html,
        } => commands::tree::execute(&config, template, data, fragment, *html)?,
        Commands::Classify { old, new } => commands::classify::execute(&config, old, new)?,
        Commands::Config(command) => {
            println!("{}", commands::config::execute(&config, command)?);
            return Ok(());
        }
    };

    print_json(&output, cli.pretty)
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
