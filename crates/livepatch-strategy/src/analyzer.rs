//! Strategy analyzer: classification with caching, metrics and fallback policy
//!
//! ## Fallback policy
//!
//! Strategies are ordered by generality (1 < 2 < 3 < 4). Asking for a more
//! general strategy than recommended is always granted. Asking for a more
//! specific one is granted only when that strategy supports the detected
//! pattern; otherwise the recommendation stands and the refusal reason is
//! recorded on the result.
//!
//! ## Thread Safety
//!
//! Share one analyzer behind an `Arc`. The cache and the metrics each sit
//! behind their own reader/writer lock; configuration can be swapped at
//! runtime with [`StrategyAnalyzer::set_config`].

use livepatch_classifier::{HtmlClassifier, RuleClassifier};
use livepatch_config::AnalyzerConfig;
use livepatch_core::{AnalysisResult, ClassificationError, ContentHash, PatternType, Strategy};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::cache::{AnalysisCache, CacheStats};
use crate::metrics::StrategyMetrics;

/// Outcome of a preferred-strategy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackDecision {
    /// The preference equals the recommendation
    Keep,
    Grant(Strategy),
    Refuse(String),
}

/// Decide whether `preferred` may replace `recommended` for `pattern`
pub fn check_fallback(recommended: Strategy, pattern: PatternType, preferred: Strategy) -> FallbackDecision {
    if preferred == recommended {
        FallbackDecision::Keep
    } else if preferred > recommended || preferred.supports(pattern) {
        FallbackDecision::Grant(preferred)
    } else {
        FallbackDecision::Refuse(format!(
            "{preferred} cannot represent a {pattern} change; keeping {recommended}"
        ))
    }
}

pub struct StrategyAnalyzer {
    classifier: Arc<dyn HtmlClassifier>,
    cache: AnalysisCache,
    metrics: RwLock<StrategyMetrics>,
    config: RwLock<AnalyzerConfig>,
}

impl StrategyAnalyzer {
    pub fn new(classifier: Arc<dyn HtmlClassifier>, config: AnalyzerConfig) -> Self {
        Self {
            classifier,
            cache: AnalysisCache::new(config.cache_ttl(), config.cache_max_size),
            metrics: RwLock::new(StrategyMetrics::default()),
            config: RwLock::new(config),
        }
    }

    /// Analyzer backed by the built-in [`RuleClassifier`]
    pub fn with_rule_classifier(config: AnalyzerConfig) -> Self {
        Self::new(Arc::new(RuleClassifier::new()), config)
    }

    pub fn classifier(&self) -> &Arc<dyn HtmlClassifier> {
        &self.classifier
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.config.read().clone()
    }

    /// Replace the configuration without restarting
    ///
    /// Disabling the cache also clears it so re-enabling starts fresh.
    pub fn set_config(&self, config: AnalyzerConfig) {
        self.cache.set_limits(config.cache_ttl(), config.cache_max_size);
        if !config.cache_enabled {
            self.cache.clear();
        }
        debug!(
            cache_enabled = config.cache_enabled,
            cache_ttl_secs = config.cache_ttl_secs,
            cache_max_size = config.cache_max_size,
            fallback_enabled = config.fallback_enabled,
            metrics_enabled = config.metrics_enabled,
            "analyzer config updated"
        );
        *self.config.write() = config;
    }

    /// Classify the change from `old_html` to `new_html`
    pub fn analyze(&self, old_html: &str, new_html: &str) -> Result<AnalysisResult, ClassificationError> {
        let config = self.config();
        let result = self.analyze_inner(old_html, new_html, &config)?;
        if config.metrics_enabled {
            self.metrics.write().record(&result);
        }
        Ok(result)
    }

    /// Classify and then apply the fallback policy for `preferred`
    pub fn analyze_with_fallback(
        &self,
        old_html: &str,
        new_html: &str,
        preferred: Strategy,
    ) -> Result<AnalysisResult, ClassificationError> {
        let config = self.config();
        let recommended = self.analyze_inner(old_html, new_html, &config)?;

        let result = if !config.fallback_enabled {
            if preferred == recommended.strategy {
                recommended
            } else {
                recommended.with_refused_fallback("fallback disabled")
            }
        } else {
            match check_fallback(recommended.strategy, recommended.pattern, preferred) {
                FallbackDecision::Keep => recommended,
                FallbackDecision::Grant(strategy) => {
                    let reason = format!("requested {strategy} over recommended {}", recommended.strategy);
                    debug!(%reason, "fallback granted");
                    recommended.with_fallback(strategy, reason)
                }
                FallbackDecision::Refuse(reason) => {
                    warn!(%reason, "fallback refused");
                    recommended.with_refused_fallback(reason)
                }
            }
        };

        if config.metrics_enabled {
            let mut metrics = self.metrics.write();
            metrics.record(&result);
            if result.uses_fallback {
                metrics.record_fallback();
            } else if result.fallback_reason.is_some() {
                metrics.record_refused_fallback();
            }
        }
        Ok(result)
    }

    /// Strategy only, for latency-sensitive callers
    ///
    /// Served from the cache when possible, otherwise the classifier's quick
    /// path is used and nothing is cached.
    pub fn quick_analyze(&self, old_html: &str, new_html: &str) -> Result<Strategy, ClassificationError> {
        let config = self.config();
        if config.cache_enabled {
            if let Some(hit) = self.cache.get(&ContentHash::transition(old_html, new_html)) {
                let hit = hit.as_cache_hit();
                if config.metrics_enabled {
                    self.metrics.write().record(&hit);
                }
                return Ok(hit.strategy);
            }
        }

        let started = Instant::now();
        let classification = self.classifier.quick_diff(old_html, new_html)?;
        let result = AnalysisResult::from_classification(classification, started.elapsed());
        if config.metrics_enabled {
            self.metrics.write().record(&result);
        }
        Ok(result.strategy)
    }

    fn analyze_inner(
        &self,
        old_html: &str,
        new_html: &str,
        config: &AnalyzerConfig,
    ) -> Result<AnalysisResult, ClassificationError> {
        let key = ContentHash::transition(old_html, new_html);
        if config.cache_enabled {
            if let Some(hit) = self.cache.get(&key) {
                debug!(key = %key.short_hex(), strategy = hit.strategy.number(), "analysis cache hit");
                return Ok(hit.as_cache_hit());
            }
        }

        let started = Instant::now();
        let classification = self.classifier.diff(old_html, new_html)?;
        let result = AnalysisResult::from_classification(classification, started.elapsed());
        debug!(
            key = %key.short_hex(),
            pattern = %result.pattern,
            strategy = result.strategy.number(),
            elapsed_us = result.analysis_time.as_micros() as u64,
            "analysis cache miss"
        );

        if config.cache_enabled {
            self.cache.insert(key, result.clone());
        }
        Ok(result)
    }

    pub fn metrics(&self) -> StrategyMetrics {
        self.metrics.read().clone()
    }

    /// Operator reset of all counters
    pub fn reset_metrics(&self) {
        self.metrics.write().reset();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
