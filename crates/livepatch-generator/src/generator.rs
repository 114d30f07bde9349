//! Update generator
//!
//! ## Pipeline
//!
//! render old and new → analyze → encode with the selected strategy → on an
//! encoder failure retry with full replacement (when fallback is enabled) →
//! build the fragment.
//!
//! ## Thread Safety
//!
//! One generator serves many request threads. The analyzer and encoders are
//! internally synchronized; configuration and metrics each sit behind their
//! own `RwLock`. Strategy-1 static caching and the tree differ keep state per
//! fragment key, so callers pass a stable key (the template name or a
//! fragment id) per logical page region.

use livepatch_config::{GeneratorConfig, LivepatchConfig, TreeConfig};
use livepatch_core::{AnalysisResult, Fragment, FragmentData, Strategy};
use livepatch_strategy::{EncodeContext, EncoderSet, StrategyAnalyzer};
use livepatch_template::{Renderer, Template, TemplateRenderer};
use livepatch_tree::{Tree, TreeDiffer, TreeError};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::GenerationResult;
use crate::metrics::GenerationMetrics;

pub struct UpdateGenerator {
    renderer: Arc<dyn Renderer>,
    analyzer: Arc<StrategyAnalyzer>,
    encoders: EncoderSet,
    tree: TreeDiffer,
    config: RwLock<GeneratorConfig>,
    metrics: RwLock<GenerationMetrics>,
}

impl UpdateGenerator {
    pub fn new(renderer: Arc<dyn Renderer>, analyzer: Arc<StrategyAnalyzer>, config: GeneratorConfig) -> Self {
        let encoders = EncoderSet::default();
        encoders.static_dynamic().set_cache_statics(config.cache_statics);
        Self {
            renderer,
            analyzer,
            encoders,
            tree: TreeDiffer::default(),
            config: RwLock::new(config),
            metrics: RwLock::new(GenerationMetrics::default()),
        }
    }

    /// Generator with the built-in renderer and rule classifier
    pub fn from_config(config: &LivepatchConfig) -> Self {
        let analyzer = Arc::new(StrategyAnalyzer::with_rule_classifier(config.analyzer.clone()));
        let generator = Self::new(Arc::new(TemplateRenderer::new()), analyzer, config.generator.clone());
        generator.encoders.replacement().set_config(config.replacement.clone());
        generator.tree.set_config(config.tree.clone());
        generator
    }

    pub fn analyzer(&self) -> &Arc<StrategyAnalyzer> {
        &self.analyzer
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn tree(&self) -> &TreeDiffer {
        &self.tree
    }

    pub fn config(&self) -> GeneratorConfig {
        self.config.read().clone()
    }

    /// Replace the generator configuration without restarting
    pub fn set_config(&self, config: GeneratorConfig) {
        self.encoders.static_dynamic().set_cache_statics(config.cache_statics);
        debug!(
            fallback_enabled = config.fallback_enabled,
            metrics_enabled = config.metrics_enabled,
            max_generation_time_ms = config.max_generation_time_ms,
            preferred_strategy = ?config.preferred_strategy,
            cache_statics = config.cache_statics,
            "generator config updated"
        );
        *self.config.write() = config;
    }

    pub fn set_tree_config(&self, config: TreeConfig) {
        self.tree.set_config(config);
    }

    /// Fragments that move a client from `old_data`'s rendering to `new_data`'s
    ///
    /// `old_data = None` means the client shows nothing yet. Identical
    /// renderings produce no fragments.
    pub fn generate_update(
        &self,
        template: &Template,
        old_data: Option<&Value>,
        new_data: &Value,
    ) -> GenerationResult<Vec<Fragment>> {
        let config = self.config();
        let started = Instant::now();
        self.with_metrics(&config, GenerationMetrics::record_attempt);

        let result = self.generate(template, old_data, new_data, &config, started);
        match &result {
            Ok(fragments) => {
                let elapsed = started.elapsed();
                let slow = self.check_budget(template.name(), elapsed, &config);
                if config.metrics_enabled {
                    let mut metrics = self.metrics.write();
                    for fragment in fragments {
                        metrics.record_fragment(
                            fragment.data.strategy(),
                            fragment.metadata.original_size,
                            fragment.metadata.compressed_size,
                            fragment.metadata.fallback_used,
                        );
                    }
                    metrics.record_success(elapsed, slow);
                }
            }
            Err(err) => {
                debug!(template = template.name(), kind = err.kind(), "generation failed");
                self.with_metrics(&config, GenerationMetrics::record_failure);
            }
        }
        result
    }

    fn generate(
        &self,
        template: &Template,
        old_data: Option<&Value>,
        new_data: &Value,
        config: &GeneratorConfig,
        started: Instant,
    ) -> GenerationResult<Vec<Fragment>> {
        let old_html = match old_data {
            Some(data) => self.renderer.render(template, data)?,
            None => String::new(),
        };
        let new_html = self.renderer.render(template, new_data)?;
        if old_html == new_html {
            debug!(template = template.name(), "rendering unchanged");
            return Ok(Vec::new());
        }

        let analysis = match config.preferred_strategy {
            Some(preferred) => self.analyzer.analyze_with_fallback(&old_html, &new_html, preferred)?,
            None => self.analyzer.analyze(&old_html, &new_html)?,
        };

        let ctx = EncodeContext::new(&old_html, &new_html, &analysis).with_fragment_key(template.name());
        let (data, analysis) = match self.encoders.encode(analysis.strategy, &ctx) {
            Ok(data) => (data, analysis),
            Err(err) if config.fallback_enabled => {
                warn!(
                    template = template.name(),
                    strategy = analysis.strategy.number(),
                    error = %err,
                    "encoder failed, falling back to full replacement"
                );
                self.with_metrics(config, GenerationMetrics::record_failure);
                let fallback = analysis.with_fallback(Strategy::Replacement, err.to_string());
                let data = self.replace(&old_html, &new_html, &fallback)?;
                (data, fallback)
            }
            Err(err) => return Err(err.into()),
        };

        let fallback_used = analysis.uses_fallback;
        let fragment = Fragment::build(
            data,
            &analysis,
            &old_html,
            &new_html,
            started.elapsed(),
            fallback_used,
        );
        debug!(
            template = template.name(),
            fragment = %fragment.id,
            strategy = fragment.metadata.strategy_number,
            fallback_used,
            original = fragment.metadata.original_size,
            encoded = fragment.metadata.compressed_size,
            "generated fragment"
        );
        Ok(vec![fragment])
    }

    fn replace(&self, old_html: &str, new_html: &str, analysis: &AnalysisResult) -> GenerationResult<FragmentData> {
        let ctx = EncodeContext::new(old_html, new_html, analysis);
        Ok(self.encoders.encode(Strategy::Replacement, &ctx)?)
    }

    /// Tree update for one fragment id
    ///
    /// A template change for a known fragment id counts as a failed
    /// generation. With fallback enabled the skeleton is rebuilt and a first
    /// render is returned; otherwise the mismatch is surfaced.
    pub fn generate_tree_update(&self, fragment_id: &str, template: &Template, data: &Value) -> GenerationResult<Tree> {
        let config = self.config();
        let started = Instant::now();
        self.with_metrics(&config, GenerationMetrics::record_attempt);

        let result = match self.tree.try_diff(fragment_id, template, data) {
            Err(TreeError::StructuralMismatch(mismatch)) if config.fallback_enabled => {
                warn!(
                    fragment = fragment_id,
                    expected = %mismatch.expected,
                    found = %mismatch.found,
                    "skeleton mismatch, rebuilding"
                );
                self.with_metrics(&config, GenerationMetrics::record_failure);
                self.tree.reset_fragment(fragment_id);
                self.tree.try_diff(fragment_id, template, data)
            }
            other => other,
        };

        match result {
            Ok(tree) => {
                let elapsed = started.elapsed();
                let slow = self.check_budget(fragment_id, elapsed, &config);
                if config.metrics_enabled {
                    let size = serde_json::to_vec(&tree).map(|bytes| bytes.len()).unwrap_or(0);
                    let mut metrics = self.metrics.write();
                    metrics.record_tree_update(size);
                    metrics.record_success(elapsed, slow);
                }
                Ok(tree)
            }
            Err(err) => {
                self.with_metrics(&config, GenerationMetrics::record_failure);
                Err(err.into())
            }
        }
    }

    /// Forget every tree skeleton and every statics set sent
    pub fn reset(&self) {
        self.tree.reset();
        self.encoders.static_dynamic().reset();
    }

    /// Forget what was sent for one fragment key
    pub fn reset_fragment(&self, fragment_key: &str) {
        self.tree.reset_fragment(fragment_key);
        self.encoders.static_dynamic().forget(fragment_key);
    }

    pub fn metrics(&self) -> GenerationMetrics {
        self.metrics.read().clone()
    }

    pub fn reset_metrics(&self) {
        self.metrics.write().reset();
    }

    fn with_metrics(&self, config: &GeneratorConfig, record: impl FnOnce(&mut GenerationMetrics)) {
        if config.metrics_enabled {
            record(&mut *self.metrics.write());
        }
    }

    /// Log a generation over the advisory budget; never aborts it
    fn check_budget(&self, key: &str, elapsed: Duration, config: &GeneratorConfig) -> bool {
        let budget = config.max_generation_time();
        let slow = elapsed > budget;
        if slow {
            warn!(
                key,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "generation exceeded time budget"
            );
        }
        slow
    }
}
