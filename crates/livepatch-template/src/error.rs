//! Template errors
//!
//! Everything here surfaces as a render error in the update pipeline: fatal
//! for the call, never retried.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unsupported template construct at line {line}: {construct}")]
    Unsupported { line: usize, construct: String },

    #[error("field not found: {path}")]
    FieldNotFound { path: String },

    #[error("cannot range over {path}: not a list or map")]
    NotIterable { path: String },

    #[error("data is not representable as JSON: {message}")]
    InvalidData { message: String },
}

pub type TemplateResult<T> = Result<T, TemplateError>;

impl TemplateError {
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported<S: Into<String>>(line: usize, construct: S) -> Self {
        Self::Unsupported {
            line,
            construct: construct.into(),
        }
    }

    /// Errors caused by the template text rather than the data
    pub fn is_template_fault(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Unsupported { .. })
    }
}
