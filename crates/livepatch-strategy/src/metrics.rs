//! Analyzer usage and rule-correctness metrics

use livepatch_core::serde_util::duration_micros;
use livepatch_core::{AnalysisResult, Strategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Bucket counting classifications that followed the canonical mapping
pub const CORRECT_MAPPING: &str = "correct_mapping";
/// Bucket counting classifications that did not
pub const UNEXPECTED_MAPPING: &str = "unexpected_mapping";

/// Counters are monotonic until [`StrategyMetrics::reset`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetrics {
    pub total_analyses: u64,
    pub cache_hits: u64,
    /// Keyed by strategy name
    pub strategy_usage: BTreeMap<String, u64>,
    /// Keyed by pattern name
    pub pattern_distribution: BTreeMap<String, u64>,
    pub fallback_count: u64,
    pub refused_fallbacks: u64,
    /// `"<pattern>->strategy<N>"` plus the two mapping buckets
    pub rule_correctness: BTreeMap<String, u64>,
    /// Running average over analyses that were not cache hits
    #[serde(with = "duration_micros")]
    pub average_analysis_time: Duration,
    #[serde(skip)]
    timed_analyses: u64,
}

impl StrategyMetrics {
    /// Count one analysis call
    pub fn record(&mut self, result: &AnalysisResult) {
        self.total_analyses += 1;
        if result.cache_hit {
            self.cache_hits += 1;
        } else {
            self.record_time(result.analysis_time);
        }

        *self
            .strategy_usage
            .entry(result.strategy.name().to_string())
            .or_default() += 1;
        *self
            .pattern_distribution
            .entry(result.pattern.as_str().to_string())
            .or_default() += 1;

        let recommended = result.recommended_strategy();
        *self
            .rule_correctness
            .entry(format!("{}->{}", result.pattern, recommended))
            .or_default() += 1;
        let bucket = if Strategy::canonical_for(result.pattern) == recommended {
            CORRECT_MAPPING
        } else {
            UNEXPECTED_MAPPING
        };
        *self.rule_correctness.entry(bucket.to_string()).or_default() += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallback_count += 1;
    }

    pub fn record_refused_fallback(&mut self) {
        self.refused_fallbacks += 1;
    }

    fn record_time(&mut self, elapsed: Duration) {
        self.timed_analyses += 1;
        let n = self.timed_analyses as u32;
        let average = self.average_analysis_time;
        self.average_analysis_time = if elapsed >= average {
            average + (elapsed - average) / n
        } else {
            average - (average - elapsed) / n
        };
    }

    pub fn cache_hit_ratio(&self) -> f64 {
        if self.total_analyses == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_analyses as f64
        }
    }

    /// Share of classifications that matched the canonical mapping
    pub fn rule_accuracy(&self) -> f64 {
        let correct = self.rule_correctness.get(CORRECT_MAPPING).copied().unwrap_or(0);
        let unexpected = self.rule_correctness.get(UNEXPECTED_MAPPING).copied().unwrap_or(0);
        let total = correct + unexpected;
        if total == 0 {
            1.0
        } else {
            correct as f64 / total as f64
        }
    }

    pub fn usage(&self, strategy: Strategy) -> u64 {
        self.strategy_usage.get(strategy.name()).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_core::{Classification, PatternType};

    fn analysis(pattern: PatternType, micros: u64) -> AnalysisResult {
        AnalysisResult::from_classification(
            Classification::new(pattern, "test"),
            Duration::from_micros(micros),
        )
    }

    #[test]
    fn test_counts_and_buckets() {
        let mut metrics = StrategyMetrics::default();
        metrics.record(&analysis(PatternType::Granular, 10));
        metrics.record(&analysis(PatternType::Granular, 30).as_cache_hit());

        assert_eq!(metrics.total_analyses, 2);
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.usage(Strategy::Granular), 2);
        assert_eq!(metrics.pattern_distribution["granular"], 2);
        assert_eq!(metrics.rule_correctness["granular->strategy3"], 2);
        assert_eq!(metrics.rule_correctness[CORRECT_MAPPING], 2);
        assert_eq!(metrics.cache_hit_ratio(), 0.5);
    }

    #[test]
    fn test_average_excludes_cache_hits() {
        let mut metrics = StrategyMetrics::default();
        metrics.record(&analysis(PatternType::StaticDynamic, 10));
        metrics.record(&analysis(PatternType::StaticDynamic, 30));
        metrics.record(&analysis(PatternType::StaticDynamic, 1000).as_cache_hit());
        assert_eq!(metrics.average_analysis_time, Duration::from_micros(20));
    }

    #[test]
    fn test_unexpected_mapping() {
        let mut metrics = StrategyMetrics::default();
        let mut odd = Classification::new(PatternType::Markerizable, "odd");
        odd.strategy = Strategy::Replacement;
        metrics.record(&AnalysisResult::from_classification(odd, Duration::ZERO));
        assert_eq!(metrics.rule_correctness["markerizable->strategy4"], 1);
        assert_eq!(metrics.rule_correctness[UNEXPECTED_MAPPING], 1);
        assert_eq!(metrics.rule_accuracy(), 0.0);
    }

    #[test]
    fn test_fallback_uses_recommended_for_buckets() {
        let mut metrics = StrategyMetrics::default();
        let result = analysis(PatternType::StaticDynamic, 5).with_fallback(Strategy::Replacement, "asked");
        metrics.record(&result);
        metrics.record_fallback();
        assert_eq!(metrics.usage(Strategy::Replacement), 1);
        assert_eq!(metrics.rule_correctness["static_dynamic->strategy1"], 1);
        assert_eq!(metrics.fallback_count, 1);
    }

    #[test]
    fn test_reset() {
        let mut metrics = StrategyMetrics::default();
        metrics.record(&analysis(PatternType::Replacement, 5));
        metrics.reset();
        assert_eq!(metrics, StrategyMetrics::default());
    }
}
