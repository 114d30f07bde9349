//! Error taxonomy shared by the encoding pipeline
//!
//! - [`ClassificationError`]: the classifier could not judge a pair. Fatal for
//!   the call, since without a pattern there is no fallback target.
//! - [`EncodingError`]: one encoder could not represent a change. Recoverable by
//!   falling back to full replacement.
//! - [`StructuralMismatchError`]: a cached skeleton no longer matches.
//!   Recoverable by invalidating and rebuilding the skeleton.

use std::fmt;
use thiserror::Error;

use crate::strategy::Strategy;

/// Which input of a pair an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlSide {
    Old,
    New,
}

impl fmt::Display for HtmlSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => f.write_str("old"),
            Self::New => f.write_str("new"),
        }
    }
}

/// The classifier could not produce a pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("unparsable {side} HTML: {message}")]
    Unparsable { side: HtmlSide, message: String },

    #[error("invalid strategy number: {0} (expected 1-4)")]
    InvalidStrategy(u8),
}

impl ClassificationError {
    pub fn unparsable<S: Into<String>>(side: HtmlSide, message: S) -> Self {
        Self::Unparsable {
            side,
            message: message.into(),
        }
    }
}

/// An encoder could not represent a change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("{strategy} cannot encode this change: {reason}")]
    Unsupported { strategy: Strategy, reason: String },

    #[error("{strategy} payload is inconsistent: {reason}")]
    Inconsistent { strategy: Strategy, reason: String },
}

impl EncodingError {
    pub fn unsupported<S: Into<String>>(strategy: Strategy, reason: S) -> Self {
        Self::Unsupported {
            strategy,
            reason: reason.into(),
        }
    }

    pub fn inconsistent<S: Into<String>>(strategy: Strategy, reason: S) -> Self {
        Self::Inconsistent {
            strategy,
            reason: reason.into(),
        }
    }

    /// Strategy that raised the error
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Unsupported { strategy, .. } | Self::Inconsistent { strategy, .. } => *strategy,
        }
    }
}

/// A cached skeleton no longer matches what is being rendered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("skeleton mismatch for fragment {fragment_id}: expected {expected}, found {found}")]
pub struct StructuralMismatchError {
    pub fragment_id: String,
    pub expected: String,
    pub found: String,
}

impl StructuralMismatchError {
    pub fn new(
        fragment_id: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            fragment_id: fragment_id.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
