use livepatch_core::html::{scan_tags, Tag};
use livepatch_core::{Classification, ClassificationError, HtmlSide, PatternType};
use tracing::{debug, trace};

use crate::conditional::{self, Toggle};
use crate::document::ParsedHtml;
use crate::HtmlClassifier;

/// Deterministic rule-based classifier
///
/// Rules run in order and the first match wins:
///
/// 1. identical renderings
/// 2. one side empty (show/hide when the other side is a single element)
/// 3. both sides must parse
/// 4. conditional toggles (boolean attribute, nil value, if/else swap)
/// 5. same tags: text-only change, or attribute change when only attributes differ
/// 6. one contiguous run of tags inserted or removed
/// 7. anything else needs full replacement
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classify(&self, old_html: &str, new_html: &str, with_branches: bool) -> Result<Classification, ClassificationError> {
        if old_html == new_html {
            return Ok(Classification::new(PatternType::StaticDynamic, "no change"));
        }

        let attach = |toggle: Toggle, classification: Classification| {
            if with_branches {
                classification.with_conditional(toggle.pattern(old_html, new_html))
            } else {
                classification
            }
        };

        if old_html.is_empty() || new_html.is_empty() {
            let (visible, side, reason) = if new_html.is_empty() {
                (old_html, HtmlSide::Old, "content removed")
            } else {
                (new_html, HtmlSide::New, "content added")
            };
            let classification = Classification::new(PatternType::StaticDynamic, reason);
            let parsed = ParsedHtml::parse(visible, side)?;
            return Ok(match conditional::show_hide(new_html, &parsed) {
                Some(toggle) => attach(toggle, classification),
                None => classification,
            });
        }

        let old_doc = ParsedHtml::parse(old_html, HtmlSide::Old)?;
        let new_doc = ParsedHtml::parse(new_html, HtmlSide::New)?;
        if let Some(toggle) = conditional::detect(old_html, new_html, &old_doc, &new_doc) {
            let reason = format!("{} conditional", toggle.condition_type.as_str());
            return Ok(attach(toggle, Classification::new(PatternType::StaticDynamic, reason)));
        }

        Ok(structural(old_html, new_html))
    }
}

impl HtmlClassifier for RuleClassifier {
    fn diff(&self, old_html: &str, new_html: &str) -> Result<Classification, ClassificationError> {
        let classification = self.classify(old_html, new_html, true)?;
        debug!(
            pattern = %classification.pattern,
            strategy = classification.strategy.number(),
            reason = %classification.reason,
            "classified change"
        );
        Ok(classification)
    }

    /// Same parsing and rules as [`diff`](Self::diff); conditional branch
    /// renderings are not copied out
    fn quick_diff(&self, old_html: &str, new_html: &str) -> Result<Classification, ClassificationError> {
        self.classify(old_html, new_html, false)
    }
}

/// Rules 5 to 7: compare the tag sequences
fn structural(old_html: &str, new_html: &str) -> Classification {
    let old_tags = scan_tags(old_html);
    let new_tags = scan_tags(new_html);

    if old_tags.len() == new_tags.len() {
        if old_tags.iter().zip(&new_tags).all(|(a, b)| a.raw == b.raw) {
            return Classification::new(PatternType::StaticDynamic, "text change");
        }
        if old_tags.iter().zip(&new_tags).all(|(a, b)| a.bare() == b.bare()) {
            return Classification::new(PatternType::Markerizable, "attribute change");
        }
    } else if let Some(run) = contiguous_run(&old_tags, &new_tags) {
        trace!(run, "contiguous tag run");
        let reason = if new_tags.len() > old_tags.len() {
            "elements inserted"
        } else {
            "elements removed"
        };
        return Classification::new(PatternType::Granular, reason);
    }

    Classification::new(PatternType::Replacement, "structural change")
}

/// Length of the tag run inserted into (or removed from) the shorter sequence,
/// when the longer one is the shorter with exactly one contiguous run added
fn contiguous_run(old_tags: &[Tag<'_>], new_tags: &[Tag<'_>]) -> Option<usize> {
    let (short, long) = if old_tags.len() < new_tags.len() {
        (old_tags, new_tags)
    } else {
        (new_tags, old_tags)
    };
    let same = |a: &Tag<'_>, b: &Tag<'_>| a.bare() == b.bare();

    let prefix = short.iter().zip(long).take_while(|(a, b)| same(a, b)).count();
    let suffix = short
        .iter()
        .rev()
        .zip(long.iter().rev())
        .take_while(|(a, b)| same(a, b))
        .count();
    (prefix + suffix >= short.len()).then(|| long.len() - short.len())
}
