//! Fragment wire object
//!
//! One fragment is produced per logical change and consumed by the transport
//! layer. Fragments are immutable once built.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analysis::AnalysisResult;
use crate::error::EncodingError;
use crate::hash::fragment_id;
use crate::payload::FragmentData;
use crate::serde_util::duration_micros;
use crate::strategy::PatternType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentMetadata {
    #[serde(with = "duration_micros")]
    pub generation_time: Duration,
    /// Bytes of the new HTML
    pub original_size: usize,
    /// Bytes of the serialized payload
    pub compressed_size: usize,
    /// `compressed_size / original_size`, 0 for an empty rendering
    pub compression_ratio: f64,
    pub strategy_number: u8,
    pub pattern_type: PatternType,
    pub confidence: f64,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: String,
    pub strategy_name: String,
    pub action: String,
    pub data: FragmentData,
    pub metadata: FragmentMetadata,
}

impl Fragment {
    /// Build a fragment for the `old_html -> new_html` transition
    ///
    /// The strategy is taken from the payload, so a fallback payload is always
    /// labelled with the strategy that actually produced it.
    pub fn build(
        data: FragmentData,
        analysis: &AnalysisResult,
        old_html: &str,
        new_html: &str,
        generation_time: Duration,
        fallback_used: bool,
    ) -> Self {
        let strategy = data.strategy();
        let compressed_size = serde_json::to_vec(&data).map(|v| v.len()).unwrap_or(0);
        let original_size = new_html.len();
        let compression_ratio = if original_size == 0 {
            0.0
        } else {
            compressed_size as f64 / original_size as f64
        };

        Self {
            id: fragment_id(strategy.name(), old_html, new_html),
            strategy_name: strategy.name().to_string(),
            action: strategy.action().to_string(),
            data,
            metadata: FragmentMetadata {
                generation_time,
                original_size,
                compressed_size,
                compression_ratio,
                strategy_number: strategy.number(),
                pattern_type: analysis.pattern,
                confidence: analysis.confidence,
                fallback_used,
            },
        }
    }

    /// Reconstruct the new HTML the way a client would
    pub fn reconstruct(
        &self,
        current_html: &str,
        cached_statics: Option<&[String]>,
    ) -> Result<String, EncodingError> {
        self.data.apply(current_html, cached_statics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Classification;
    use crate::payload::{Complexity, ReplacementData};
    use crate::strategy::Strategy;

    #[test]
    fn test_build_replacement_fragment() {
        let old = "<div><p>Old</p></div>";
        let new = "<article><h1>New</h1></article>";
        let analysis = AnalysisResult::from_classification(
            Classification::new(PatternType::Replacement, "structure changed"),
            Duration::ZERO,
        );
        let data = FragmentData::Replacement(ReplacementData {
            content: new.to_string(),
            complexity: Complexity::ComplexStructural,
            reason: "structure changed".into(),
            is_empty: false,
        });

        let fragment = Fragment::build(data, &analysis, old, new, Duration::from_micros(5), false);
        assert_eq!(fragment.strategy_name, "replacement");
        assert_eq!(fragment.action, "replace_content");
        assert_eq!(fragment.metadata.strategy_number, Strategy::Replacement.number());
        assert_eq!(fragment.metadata.original_size, new.len());
        assert!(fragment.metadata.compression_ratio > 0.0);
        assert_eq!(fragment.reconstruct(old, None).unwrap(), new);

        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["strategyName"], "replacement");
        assert_eq!(json["metadata"]["generationTime"], 5);
        assert_eq!(json["data"]["content"], new);
    }
}
