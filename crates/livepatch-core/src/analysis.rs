//! Classification and analysis results
//!
//! A [`Classification`] is what a classifier reports for one (old, new) pair.
//! An [`AnalysisResult`] is what the analyzer hands to encoders: the
//! classification plus cache and fallback bookkeeping. Results are never
//! mutated in place; a fallback produces a new result that keeps the original.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::serde_util::duration_micros;
use crate::strategy::{ConditionalPattern, PatternType, Strategy};

/// Classifier output for one rendering pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub strategy: Strategy,
    pub pattern: PatternType,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalPattern>,
}

impl Classification {
    pub fn new(pattern: PatternType, reason: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::canonical_for(pattern),
            pattern,
            reason: reason.into(),
            conditional: None,
        }
    }

    pub fn with_conditional(mut self, conditional: ConditionalPattern) -> Self {
        self.conditional = Some(conditional);
        self
    }

    /// Whether the suggested strategy matches the canonical pattern mapping
    pub fn is_canonical(&self) -> bool {
        Strategy::canonical_for(self.pattern) == self.strategy
    }
}

/// Strategy decision for one rendering pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub strategy: Strategy,
    pub pattern: PatternType,
    /// Always 1.0: classification is rule-based
    pub confidence: f64,
    pub cache_hit: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub uses_fallback: bool,
    #[serde(with = "duration_micros")]
    pub analysis_time: Duration,
    /// The recommendation this result was derived from, if it is a fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Box<AnalysisResult>>,
}

impl AnalysisResult {
    pub fn from_classification(classification: Classification, analysis_time: Duration) -> Self {
        Self {
            strategy: classification.strategy,
            pattern: classification.pattern,
            confidence: 1.0,
            cache_hit: false,
            reason: classification.reason,
            conditional: classification.conditional,
            fallback_reason: None,
            uses_fallback: false,
            analysis_time,
            original: None,
        }
    }

    /// Copy of this result marked as served from cache
    pub fn as_cache_hit(&self) -> Self {
        Self {
            cache_hit: true,
            ..self.clone()
        }
    }

    /// New result using `strategy` instead of the recommendation
    pub fn with_fallback(&self, strategy: Strategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            fallback_reason: Some(reason.into()),
            uses_fallback: true,
            original: Some(Box::new(self.clone())),
            ..self.clone()
        }
    }

    /// New result that keeps the recommendation but records why a request was refused
    pub fn with_refused_fallback(&self, reason: impl Into<String>) -> Self {
        Self {
            fallback_reason: Some(reason.into()),
            uses_fallback: false,
            original: Some(Box::new(self.clone())),
            ..self.clone()
        }
    }

    /// Strategy originally recommended before any fallback
    pub fn recommended_strategy(&self) -> Strategy {
        self.original
            .as_ref()
            .map_or(self.strategy, |original| original.recommended_strategy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult::from_classification(
            Classification::new(PatternType::Markerizable, "attribute change"),
            Duration::from_micros(40),
        )
    }

    #[test]
    fn test_from_classification_defaults() {
        let result = sample();
        assert_eq!(result.strategy, Strategy::Markers);
        assert_eq!(result.confidence, 1.0);
        assert!(!result.cache_hit);
        assert!(!result.uses_fallback);
        assert!(result.original.is_none());
    }

    #[test]
    fn test_fallback_keeps_original() {
        let original = sample();
        let fallback = original.with_fallback(Strategy::Replacement, "requested");
        assert_eq!(fallback.strategy, Strategy::Replacement);
        assert!(fallback.uses_fallback);
        assert_eq!(fallback.recommended_strategy(), Strategy::Markers);
        // original untouched
        assert_eq!(original.strategy, Strategy::Markers);
        assert!(original.fallback_reason.is_none());
    }

    #[test]
    fn test_refused_fallback_keeps_strategy() {
        let refused = sample().with_refused_fallback("incompatible");
        assert_eq!(refused.strategy, Strategy::Markers);
        assert!(!refused.uses_fallback);
        assert_eq!(refused.fallback_reason.as_deref(), Some("incompatible"));
    }
}
