//! HTML diff classification
//!
//! Given the previous and the next rendering of a fragment, decide what kind
//! of change happened and which encoding strategy fits it.
//!
//! ## Architecture
//!
//! - [`HtmlClassifier`]: the seam the strategy analyzer talks to
//! - [`RuleClassifier`]: deterministic, ordered rules (confidence is always 1.0)
//! - `document`: parsing and well-formedness checks on top of `html_parser`
//! - `conditional`: detection of boolean / show-hide / nil-value / if-else toggles
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livepatch_classifier::{HtmlClassifier, RuleClassifier};
//!
//! let classifier = RuleClassifier::new();
//! let result = classifier.diff("<div>Hello</div>", "<div>Hi there</div>")?;
//! assert_eq!(result.strategy.number(), 1);
//! ```

mod conditional;
mod document;
mod rules;

pub use rules::RuleClassifier;

use livepatch_core::{Classification, ClassificationError, Strategy};

/// Classifies the change between two renderings of one fragment
pub trait HtmlClassifier: Send + Sync {
    /// Full classification, including conditional detection
    fn diff(&self, old_html: &str, new_html: &str) -> Result<Classification, ClassificationError>;

    /// Cheaper classification with the same contract: same parsing, errors,
    /// pattern and strategy as `diff`, without the conditional branch renderings
    fn quick_diff(
        &self,
        old_html: &str,
        new_html: &str,
    ) -> Result<Classification, ClassificationError>;

    /// Check a strategy number coming from outside (config, client hints)
    fn validate_strategy(&self, number: u8) -> Result<Strategy, ClassificationError> {
        Strategy::try_from(number)
    }
}
