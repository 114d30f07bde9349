//! Loading configuration from TOML files and the environment

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::components::LivepatchConfig;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("failed to parse config {origin}: {message}")]
    Parse {
        /// File path or `<string>`
        origin: String,
        /// Parser message
        message: String,
    },

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Serializing the configuration failed
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl LivepatchConfig {
    /// Load configuration with precedence: defaults < file < env
    ///
    /// With no explicit path the default location is used when it exists.
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let path = config_file
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
            .filter(|p| p.exists());

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/livepatch/config.toml` or platform equivalent
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("livepatch").join("config.toml"))
    }

    /// Read a TOML file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading config file");
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            origin: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse TOML text
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            origin: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Apply `LIVEPATCH_*` environment variables
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_bool("LIVEPATCH_CACHE_ENABLED") {
            self.analyzer.cache_enabled = v;
        }
        if let Some(v) = env_parse("LIVEPATCH_CACHE_TTL_SECS") {
            self.analyzer.cache_ttl_secs = v;
        }
        if let Some(v) = env_parse("LIVEPATCH_CACHE_MAX_SIZE") {
            self.analyzer.cache_max_size = v;
        }
        if let Some(v) = env_bool("LIVEPATCH_FALLBACK_ENABLED") {
            self.analyzer.fallback_enabled = v;
            self.generator.fallback_enabled = v;
        }
        if let Some(v) = env_bool("LIVEPATCH_METRICS_ENABLED") {
            self.analyzer.metrics_enabled = v;
            self.generator.metrics_enabled = v;
        }
        if let Ok(level) = std::env::var("LIVEPATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.analyzer.cache_enabled && self.analyzer.cache_max_size == 0 {
            return Err(ConfigError::Invalid(
                "analyzer.cache_max_size must be positive when the cache is enabled".into(),
            ));
        }
        for (name, value) in [
            ("replacement.similarity_threshold", self.replacement.similarity_threshold),
            ("replacement.structural_threshold", self.replacement.structural_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within 0..=1, got {value}")));
            }
        }
        if self.tree.max_fragments == Some(0) {
            return Err(ConfigError::Invalid("tree.max_fragments must be positive".into()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LogFormat;
    use livepatch_core::Strategy;

    #[test]
    fn test_defaults() {
        let config = LivepatchConfig::default();
        assert!(config.analyzer.cache_enabled);
        assert_eq!(config.analyzer.cache_ttl_secs, 300);
        assert_eq!(config.analyzer.cache_max_size, 1000);
        assert_eq!(config.generator.max_generation_time_ms, 75);
        assert!(config.generator.preferred_strategy.is_none());
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = LivepatchConfig::from_toml_str(
            r#"
            [analyzer]
            cache_ttl_secs = 5

            [generator]
            preferred_strategy = 4

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.analyzer.cache_ttl_secs, 5);
        assert_eq!(config.analyzer.cache_max_size, 1000);
        assert_eq!(config.generator.preferred_strategy, Some(Strategy::Replacement));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_strategy_number_rejected() {
        let err = LivepatchConfig::from_toml_str("[generator]\npreferred_strategy = 9\n");
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = LivepatchConfig::default();
        config.replacement.similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = LivepatchConfig::default();
        config.analyzer.cache_max_size = 0;
        assert!(config.validate().is_err());
        config.analyzer.cache_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = LivepatchConfig::default();
        config.generator.preferred_strategy = Some(Strategy::Granular);
        let text = config.to_toml_string().unwrap();
        assert_eq!(LivepatchConfig::from_toml_str(&text).unwrap(), config);
    }
}
