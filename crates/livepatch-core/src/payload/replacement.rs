use serde::{Deserialize, Serialize};
use std::fmt;

/// Telemetry label describing why a change needed full replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    /// Unresolved template syntax in the output
    TemplateFunctions,
    /// Nesting depth changed beyond the threshold
    RecursiveStructure,
    /// Tags, attributes and text all changed at once
    MixedChanges,
    /// Low text similarity combined with high structural difference
    Unpredictable,
    ComplexStructural,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TemplateFunctions => "template-functions",
            Self::RecursiveStructure => "recursive-structure",
            Self::MixedChanges => "mixed-changes",
            Self::Unpredictable => "unpredictable",
            Self::ComplexStructural => "complex-structural",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy 4 payload: the whole new rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementData {
    /// New HTML exactly as rendered
    pub content: String,
    pub complexity: Complexity,
    pub reason: String,
    pub is_empty: bool,
}

impl ReplacementData {
    /// Idempotent: the result does not depend on what the client had before
    pub fn apply(&self) -> String {
        if self.is_empty {
            String::new()
        } else {
            self.content.clone()
        }
    }
}
