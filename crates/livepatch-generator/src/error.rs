//! Generation errors
//!
//! Render and classification failures are fatal for the call. Encoding
//! failures heal through full replacement when fallback is enabled, and a
//! structural mismatch heals by rebuilding the fragment's skeleton.

use livepatch_core::{ClassificationError, EncodingError, StructuralMismatchError};
use livepatch_template::TemplateError;
use livepatch_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("render failed: {0}")]
    Render(#[from] TemplateError),

    #[error("classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    StructuralMismatch(#[from] StructuralMismatchError),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl GenerationError {
    /// Failures a caller may retry after enabling fallback or resetting state
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::StructuralMismatch(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Render(_) => "render",
            Self::Classification(_) => "classification",
            Self::Encoding(_) => "encoding",
            Self::StructuralMismatch(_) => "structural_mismatch",
        }
    }
}

impl From<TreeError> for GenerationError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Template(err) => Self::Render(err),
            TreeError::StructuralMismatch(err) => Self::StructuralMismatch(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_core::Strategy;

    #[test]
    fn test_recoverability() {
        let encoding: GenerationError = EncodingError::unsupported(Strategy::Markers, "span").into();
        assert!(encoding.is_recoverable());
        assert_eq!(encoding.kind(), "encoding");

        let render: GenerationError = TemplateError::FieldNotFound { path: ".A".into() }.into();
        assert!(!render.is_recoverable());
        assert_eq!(render.to_string(), "render failed: field not found: .A");
    }

    #[test]
    fn test_tree_errors_map_to_their_kind() {
        let mismatch = TreeError::from(StructuralMismatchError::new("f", "a", "b"));
        assert_eq!(GenerationError::from(mismatch).kind(), "structural_mismatch");
    }
}
