use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Append,
    Prepend,
    Insert,
    Remove,
    Replace,
}

/// One DOM-level operation
///
/// `index` is a byte offset into the HTML the operation applies to: where
/// content is inserted, or where removed markup starts. `position` is the
/// insertion point relative to `selector` (`beforeend`, `afterbegin`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomOperation {
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl DomOperation {
    fn new(kind: OperationType, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
            content: None,
            position: None,
            index: None,
        }
    }

    pub fn append(selector: impl Into<String>, content: impl Into<String>, index: usize) -> Self {
        Self {
            content: Some(content.into()),
            position: Some("beforeend".into()),
            index: Some(index),
            ..Self::new(OperationType::Append, selector)
        }
    }

    pub fn prepend(selector: impl Into<String>, content: impl Into<String>, index: usize) -> Self {
        Self {
            content: Some(content.into()),
            position: Some("afterbegin".into()),
            index: Some(index),
            ..Self::new(OperationType::Prepend, selector)
        }
    }

    pub fn insert(selector: impl Into<String>, content: impl Into<String>, index: usize) -> Self {
        Self {
            content: Some(content.into()),
            position: Some("at".into()),
            index: Some(index),
            ..Self::new(OperationType::Insert, selector)
        }
    }

    /// Remove `removed` starting at byte `index`
    pub fn remove(selector: impl Into<String>, removed: impl Into<String>, index: usize) -> Self {
        Self {
            content: Some(removed.into()),
            index: Some(index),
            ..Self::new(OperationType::Remove, selector)
        }
    }

    pub fn replace(selector: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(OperationType::Replace, selector)
        }
    }

    fn content(&self) -> Result<&str, EncodingError> {
        self.content.as_deref().ok_or_else(|| {
            EncodingError::inconsistent(
                Strategy::Granular,
                format!("{:?} operation without content", self.kind),
            )
        })
    }

    fn checked_index(&self, html: &str, default: Option<usize>) -> Result<usize, EncodingError> {
        let index = self.index.or(default).ok_or_else(|| {
            EncodingError::inconsistent(
                Strategy::Granular,
                format!("{:?} operation without index", self.kind),
            )
        })?;
        if index > html.len() || !html.is_char_boundary(index) {
            return Err(EncodingError::inconsistent(
                Strategy::Granular,
                format!("index {index} invalid for {} bytes", html.len()),
            ));
        }
        Ok(index)
    }

    /// Apply this operation to `html`
    pub fn apply_to(&self, html: &mut String) -> Result<(), EncodingError> {
        match self.kind {
            OperationType::Append => {
                let index = self.checked_index(html, Some(html.len()))?;
                html.insert_str(index, self.content()?);
            }
            OperationType::Prepend => {
                let index = self.checked_index(html, Some(0))?;
                html.insert_str(index, self.content()?);
            }
            OperationType::Insert => {
                let index = self.checked_index(html, None)?;
                html.insert_str(index, self.content()?);
            }
            OperationType::Remove => {
                let index = self.checked_index(html, None)?;
                let removed = self.content()?;
                let end = index + removed.len();
                if html.get(index..end) != Some(removed) {
                    return Err(EncodingError::inconsistent(
                        Strategy::Granular,
                        format!("markup at {index} does not match removal"),
                    ));
                }
                html.replace_range(index..end, "");
            }
            OperationType::Replace => {
                *html = self.content()?.to_string();
            }
        }
        Ok(())
    }
}

/// Strategy 3 payload: ordered DOM operations
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GranularOpData {
    pub operations: Vec<DomOperation>,
    pub is_empty: bool,
}

impl GranularOpData {
    pub fn single(operation: DomOperation) -> Self {
        Self {
            operations: vec![operation],
            is_empty: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            operations: Vec::new(),
            is_empty: true,
        }
    }

    pub fn apply(&self, previous: &str) -> Result<String, EncodingError> {
        if self.is_empty {
            return Ok(String::new());
        }
        let mut html = previous.to_string();
        for operation in &self.operations {
            operation.apply_to(&mut html)?;
        }
        Ok(html)
    }
}
