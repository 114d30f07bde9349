use anyhow::{anyhow, Result};
use livepatch_config::LivepatchConfig;

use crate::cli::ConfigCommands;

/// Text to print for a config subcommand
pub fn execute(config: &LivepatchConfig, command: &ConfigCommands) -> Result<String> {
    match command {
        ConfigCommands::Show => Ok(config.to_toml_string()?),
        ConfigCommands::Path => LivepatchConfig::default_config_path()
            .map(|path| path.display().to_string())
            .ok_or_else(|| anyhow!("no configuration directory on this platform")),
    }
}
