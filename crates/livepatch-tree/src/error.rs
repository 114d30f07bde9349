use livepatch_core::StructuralMismatchError;
use livepatch_template::TemplateError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("render failed: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    StructuralMismatch(#[from] StructuralMismatchError),
}

pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    /// Mismatches heal by invalidating the fragment; render errors do not
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StructuralMismatch(_))
    }
}
