//! Strategy selection and fragment encoding
//!
//! ## Purpose
//!
//! Pure transformation: (old HTML, new HTML) → [`AnalysisResult`] → payload
//!
//! ## Architecture
//!
//! - [`StrategyAnalyzer`]: classifier + TTL/size bounded cache + metrics + fallback policy
//! - [`encoders`]: one [`FragmentEncoder`] per strategy, grouped in an [`EncoderSet`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livepatch_strategy::{EncodeContext, EncoderSet, StrategyAnalyzer};
//!
//! let analyzer = StrategyAnalyzer::with_rule_classifier(Default::default());
//! let encoders = EncoderSet::default();
//!
//! let analysis = analyzer.analyze(old_html, new_html)?;
//! let payload = encoders.encode(analysis.strategy, &EncodeContext::new(old_html, new_html, &analysis))?;
//! assert_eq!(payload.apply(old_html, None)?, new_html);
//! ```
//!
//! [`AnalysisResult`]: livepatch_core::AnalysisResult

pub mod analyzer;
pub mod cache;
pub mod encoders;
pub mod metrics;

pub use analyzer::{check_fallback, FallbackDecision, StrategyAnalyzer};
pub use cache::{AnalysisCache, CacheEntry, CacheStats};
pub use encoders::{
    EncodeContext, EncoderSet, FragmentEncoder, GranularEncoder, MarkerEncoder,
    ReplacementEncoder, StaticDynamicEncoder,
};
pub use metrics::{StrategyMetrics, CORRECT_MAPPING, UNEXPECTED_MAPPING};
