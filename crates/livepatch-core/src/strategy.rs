//! Strategy and pattern vocabulary
//!
//! Strategies are totally ordered by generality: `StaticDynamic < Markers <
//! Granular < Replacement`. A more general strategy can always represent a
//! change that a more specific one can, at a bandwidth cost.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassificationError;

/// Encoding scheme for one update, numbered 1-4 on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Strategy {
    /// Statics + dynamic slots (strategy 1)
    StaticDynamic = 1,
    /// Byte-position markers into the previous HTML (strategy 2)
    Markers = 2,
    /// Append/prepend/insert/remove/replace operations (strategy 3)
    Granular = 3,
    /// Full fragment replacement (strategy 4)
    Replacement = 4,
}

impl Strategy {
    /// All strategies, most specific first
    pub const ALL: [Strategy; 4] = [
        Strategy::StaticDynamic,
        Strategy::Markers,
        Strategy::Granular,
        Strategy::Replacement,
    ];

    /// Wire number (1-4)
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Look up a strategy by its wire number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::StaticDynamic),
            2 => Some(Self::Markers),
            3 => Some(Self::Granular),
            4 => Some(Self::Replacement),
            _ => None,
        }
    }

    /// Stable name used in fragment ids and `strategyName`
    pub fn name(self) -> &'static str {
        match self {
            Self::StaticDynamic => "static_dynamic",
            Self::Markers => "markers",
            Self::Granular => "granular",
            Self::Replacement => "replacement",
        }
    }

    /// Client action carried by fragments of this strategy
    pub fn action(self) -> &'static str {
        match self {
            Self::StaticDynamic => "update_static_dynamic",
            Self::Markers => "update_markers",
            Self::Granular => "apply_operations",
            Self::Replacement => "replace_content",
        }
    }

    /// Canonical strategy for a pattern
    pub fn canonical_for(pattern: PatternType) -> Self {
        match pattern {
            PatternType::StaticDynamic => Self::StaticDynamic,
            PatternType::Markerizable => Self::Markers,
            PatternType::Granular => Self::Granular,
            PatternType::Replacement => Self::Replacement,
        }
    }

    /// Whether this strategy can safely encode a change of the given pattern
    ///
    /// This is the downgrade compatibility matrix: strategy 1 only for
    /// static/dynamic changes, strategy 2 for markerizable or static/dynamic,
    /// strategy 3 for anything but a full replacement, strategy 4 always.
    pub fn supports(self, pattern: PatternType) -> bool {
        match self {
            Self::StaticDynamic => pattern == PatternType::StaticDynamic,
            Self::Markers => matches!(
                pattern,
                PatternType::Markerizable | PatternType::StaticDynamic
            ),
            Self::Granular => pattern != PatternType::Replacement,
            Self::Replacement => true,
        }
    }
}

impl From<Strategy> for u8 {
    fn from(strategy: Strategy) -> Self {
        strategy.number()
    }
}

impl TryFrom<u8> for Strategy {
    type Error = ClassificationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(ClassificationError::InvalidStrategy(value))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "strategy{}", self.number())
    }
}

/// What kind of change the classifier observed between two renderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Text or attribute values changed, structure did not
    StaticDynamic,
    /// Attribute substitutions at stable positions
    Markerizable,
    /// Sibling insertions, removals or prepends
    Granular,
    /// Anything else
    Replacement,
}

impl PatternType {
    pub const ALL: [PatternType; 4] = [
        PatternType::StaticDynamic,
        PatternType::Markerizable,
        PatternType::Granular,
        PatternType::Replacement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StaticDynamic => "static_dynamic",
            Self::Markerizable => "markerizable",
            Self::Granular => "granular",
            Self::Replacement => "replacement",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of conditional toggle detected between two renderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// A bare boolean attribute (`disabled`, `checked`, ...) appears or disappears
    Boolean,
    /// A whole element appears or disappears
    ShowHide,
    /// A value is present on one side and empty on the other
    NilValue,
    /// One element is swapped for a structurally different one
    IfElse,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::ShowHide => "show_hide",
            Self::NilValue => "nil_value",
            Self::IfElse => "if_else",
        }
    }
}

/// A detected conditional with both of its rendered branch states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalPattern {
    pub condition_type: ConditionType,
    /// Rendering when the driving boolean is true
    pub truthy_value: String,
    /// Rendering when the driving boolean is false
    pub falsy_value: String,
    /// Which branch the new HTML corresponds to
    pub new_is_truthy: bool,
}

impl ConditionalPattern {
    /// Branch rendering that matches the new HTML
    pub fn current_value(&self) -> &str {
        if self.new_is_truthy {
            &self.truthy_value
        } else {
            &self.falsy_value
        }
    }
}
