//! Configuration sections

use livepatch_core::Strategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete livepatch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivepatchConfig {
    /// Strategy analyzer cache and policy
    pub analyzer: AnalyzerConfig,
    /// Update generator behaviour
    pub generator: GeneratorConfig,
    /// Tree differ limits
    pub tree: TreeConfig,
    /// Full-replacement complexity heuristics
    pub replacement: ReplacementConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

/// Strategy analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Cache analysis results keyed by the (old, new) pair
    pub cache_enabled: bool,
    /// Seconds before a cache entry is treated as absent
    pub cache_ttl_secs: u64,
    /// Maximum number of cached results
    pub cache_max_size: usize,
    /// Honour preferred-strategy requests
    pub fallback_enabled: bool,
    /// Record usage and rule-correctness metrics
    pub metrics_enabled: bool,
}

impl AnalyzerConfig {
    /// Cache TTL as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: 300,
            cache_max_size: 1000,
            fallback_enabled: true,
            metrics_enabled: true,
        }
    }
}

/// Update generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Retry with full replacement when an encoder fails
    pub fallback_enabled: bool,
    /// Record generation metrics
    pub metrics_enabled: bool,
    /// Advisory budget per generation; exceeding it is logged, never enforced
    pub max_generation_time_ms: u64,
    /// Strategy to request instead of the recommendation, subject to the fallback policy
    pub preferred_strategy: Option<Strategy>,
    /// Omit strategy-1 statics the client already holds for the template
    pub cache_statics: bool,
}

impl GeneratorConfig {
    /// Advisory generation budget as a `Duration`
    pub fn max_generation_time(&self) -> Duration {
        Duration::from_millis(self.max_generation_time_ms)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            metrics_enabled: true,
            max_generation_time_ms: 75,
            preferred_strategy: None,
            cache_statics: false,
        }
    }
}

/// Tree differ settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum fragments with cached skeletons; least recently used are dropped beyond it
    pub max_fragments: Option<usize>,
}

/// Thresholds for labelling full replacements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementConfig {
    /// Nesting-depth delta above which a change is "recursive-structure"
    pub depth_threshold: usize,
    /// Text similarity (0-1) below which a change may be "unpredictable"
    pub similarity_threshold: f64,
    /// Structural difference (0-1) above which a change may be "unpredictable"
    pub structural_threshold: f64,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            depth_threshold: 3,
            similarity_threshold: 0.3,
            structural_threshold: 0.5,
        }
    }
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `livepatch_strategy=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Single-line human readable
    #[serde(rename = "text")]
    Text,
    /// One JSON object per event
    #[serde(rename = "json")]
    Json,
    /// Multi-line human readable
    #[serde(rename = "pretty")]
    Pretty,
}
