//! Fragment encoders, one per strategy
//!
//! Every encoder turns an (old, new) rendering pair plus its analysis into a
//! payload that reconstructs exactly the new rendering on the client. An
//! encoder that cannot represent a change returns an [`EncodingError`]; the
//! update generator then retries with full replacement.
//!
//! Empty states are shared across strategies:
//!
//! | old | new | payload |
//! |---|---|---|
//! | `""` | `X` | `isEmpty = false`, full content |
//! | `X` | `""` | `isEmpty = true`, no content |
//! | `""` | `""` | `isEmpty = true`, no operations or dynamics |

mod granular;
mod markers;
mod replacement;
mod static_dynamic;

pub use granular::GranularEncoder;
pub use markers::MarkerEncoder;
pub use replacement::ReplacementEncoder;
pub use static_dynamic::StaticDynamicEncoder;

use livepatch_config::ReplacementConfig;
use livepatch_core::{AnalysisResult, EncodingError, FragmentData, Strategy};

/// Everything an encoder needs for one update
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub old_html: &'a str,
    pub new_html: &'a str,
    pub analysis: &'a AnalysisResult,
    /// Stable key of the logical fragment (usually the template name), used
    /// by encoders that remember what a client already holds
    pub fragment_key: Option<&'a str>,
}

impl<'a> EncodeContext<'a> {
    pub fn new(old_html: &'a str, new_html: &'a str, analysis: &'a AnalysisResult) -> Self {
        Self {
            old_html,
            new_html,
            analysis,
            fragment_key: None,
        }
    }

    pub fn with_fragment_key(mut self, key: &'a str) -> Self {
        self.fragment_key = Some(key);
        self
    }
}

pub trait FragmentEncoder: Send + Sync {
    fn strategy(&self) -> Strategy;

    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError>;
}

/// One encoder per strategy
pub struct EncoderSet {
    static_dynamic: StaticDynamicEncoder,
    markers: MarkerEncoder,
    granular: GranularEncoder,
    replacement: ReplacementEncoder,
}

impl EncoderSet {
    pub fn new(replacement: ReplacementConfig) -> Self {
        Self {
            static_dynamic: StaticDynamicEncoder::new(),
            markers: MarkerEncoder,
            granular: GranularEncoder,
            replacement: ReplacementEncoder::new(replacement),
        }
    }

    pub fn get(&self, strategy: Strategy) -> &dyn FragmentEncoder {
        match strategy {
            Strategy::StaticDynamic => &self.static_dynamic,
            Strategy::Markers => &self.markers,
            Strategy::Granular => &self.granular,
            Strategy::Replacement => &self.replacement,
        }
    }

    pub fn encode(&self, strategy: Strategy, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError> {
        self.get(strategy).encode(ctx)
    }

    pub fn static_dynamic(&self) -> &StaticDynamicEncoder {
        &self.static_dynamic
    }

    pub fn replacement(&self) -> &ReplacementEncoder {
        &self.replacement
    }
}

impl Default for EncoderSet {
    fn default() -> Self {
        Self::new(ReplacementConfig::default())
    }
}
