//! Fragment payload variants
//!
//! Each strategy has its own payload shape. Every payload can be applied to
//! the HTML the client currently shows to reconstruct the new HTML, which is
//! what the round-trip tests check and what a Rust client would call.

mod granular;
mod markers;
mod replacement;
mod static_dynamic;

pub use granular::{DomOperation, GranularOpData, OperationType};
pub use markers::{MarkerPatchData, MarkerPosition};
pub use replacement::{Complexity, ReplacementData};
pub use static_dynamic::{ConditionalSlot, StaticDynamicData};

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::strategy::Strategy;

/// Payload of one fragment, tagged on the wire by the fragment's strategy name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FragmentData {
    StaticDynamic(StaticDynamicData),
    Markers(MarkerPatchData),
    Granular(GranularOpData),
    Replacement(ReplacementData),
}

impl FragmentData {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::StaticDynamic(_) => Strategy::StaticDynamic,
            Self::Markers(_) => Strategy::Markers,
            Self::Granular(_) => Strategy::Granular,
            Self::Replacement(_) => Strategy::Replacement,
        }
    }

    /// True when the new rendering is empty
    pub fn is_empty(&self) -> bool {
        match self {
            Self::StaticDynamic(data) => data.is_empty,
            Self::Markers(data) => data.is_empty,
            Self::Granular(data) => data.is_empty,
            Self::Replacement(data) => data.is_empty,
        }
    }

    /// Reconstruct the new HTML from the client's current HTML
    ///
    /// `cached_statics` is only consulted by static/dynamic payloads that
    /// omitted their statics because the client already holds them.
    pub fn apply(
        &self,
        current_html: &str,
        cached_statics: Option<&[String]>,
    ) -> Result<String, EncodingError> {
        match self {
            Self::StaticDynamic(data) => data.apply(cached_statics),
            Self::Markers(data) => data.apply(current_html),
            Self::Granular(data) => data.apply(current_html),
            Self::Replacement(data) => Ok(data.apply()),
        }
    }
}

impl From<StaticDynamicData> for FragmentData {
    fn from(data: StaticDynamicData) -> Self {
        Self::StaticDynamic(data)
    }
}

impl From<MarkerPatchData> for FragmentData {
    fn from(data: MarkerPatchData) -> Self {
        Self::Markers(data)
    }
}

impl From<GranularOpData> for FragmentData {
    fn from(data: GranularOpData) -> Self {
        Self::Granular(data)
    }
}

impl From<ReplacementData> for FragmentData {
    fn from(data: ReplacementData) -> Self {
        Self::Replacement(data)
    }
}
