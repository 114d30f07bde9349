//! Conditional toggle detection
//!
//! Detection only decides the kind of toggle and which side is truthy. The
//! full classification then records both renderings so the client can flip
//! between them with a single boolean afterwards.

use livepatch_core::html::{scan_tags, Tag};
use livepatch_core::{ConditionType, ConditionalPattern};

use crate::document::{is_leaf, ParsedHtml};

/// Attributes whose mere presence carries the value
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "disabled", "checked", "hidden", "selected", "readonly", "required",
];

/// A detected toggle, without its branch renderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Toggle {
    pub condition_type: ConditionType,
    pub new_is_truthy: bool,
}

impl Toggle {
    fn new(condition_type: ConditionType, new_is_truthy: bool) -> Self {
        Self {
            condition_type,
            new_is_truthy,
        }
    }

    /// Both branch renderings of this toggle
    pub(crate) fn pattern(self, old_html: &str, new_html: &str) -> ConditionalPattern {
        let (truthy, falsy) = if self.new_is_truthy {
            (new_html, old_html)
        } else {
            (old_html, new_html)
        };
        ConditionalPattern {
            condition_type: self.condition_type,
            truthy_value: truthy.to_string(),
            falsy_value: falsy.to_string(),
            new_is_truthy: self.new_is_truthy,
        }
    }
}

pub(crate) fn detect(
    old_html: &str,
    new_html: &str,
    old_doc: &ParsedHtml,
    new_doc: &ParsedHtml,
) -> Option<Toggle> {
    boolean_toggle(old_html, new_html)
        .or_else(|| nil_value(old_html, new_html))
        .or_else(|| if_else(old_doc, new_doc))
}

/// Show/hide of one whole element against an empty rendering
pub(crate) fn show_hide(new_html: &str, visible: &ParsedHtml) -> Option<Toggle> {
    visible.single_element()?;
    Some(Toggle::new(ConditionType::ShowHide, !new_html.is_empty()))
}

/// Text between consecutive tags, one entry per gap (tags + 1 entries)
fn text_gaps<'a>(html: &'a str, tags: &[Tag<'a>]) -> Vec<&'a str> {
    let mut gaps = Vec::with_capacity(tags.len() + 1);
    let mut cursor = 0;
    for tag in tags {
        gaps.push(&html[cursor..tag.start]);
        cursor = tag.end;
    }
    gaps.push(&html[cursor..]);
    gaps
}

/// Only one bare boolean attribute is added or removed; everything else matches
fn boolean_toggle(old_html: &str, new_html: &str) -> Option<Toggle> {
    let old_tags = scan_tags(old_html);
    let new_tags = scan_tags(new_html);
    if old_tags.len() != new_tags.len() || text_gaps(old_html, &old_tags) != text_gaps(new_html, &new_tags) {
        return None;
    }

    let mut differing = old_tags.iter().zip(&new_tags).filter(|(a, b)| a.raw != b.raw);
    let (old_tag, new_tag) = differing.next()?;
    if differing.next().is_some() || old_tag.name != new_tag.name {
        return None;
    }

    let old_attrs = old_tag.attributes();
    let new_attrs = new_tag.attributes();
    let (longer, shorter, new_has_it) = if new_attrs.len() == old_attrs.len() + 1 {
        (&new_attrs, &old_attrs, true)
    } else if old_attrs.len() == new_attrs.len() + 1 {
        (&old_attrs, &new_attrs, false)
    } else {
        return None;
    };

    let extra: Vec<_> = longer.iter().filter(|attr| !shorter.contains(attr)).collect();
    match extra.as_slice() {
        [(name, None)] if BOOLEAN_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()) => {
            // the remaining attributes must be identical
            let rest: Vec<_> = longer.iter().filter(|attr| attr.0 != *name).collect();
            let shorter: Vec<_> = shorter.iter().collect();
            (rest == shorter).then(|| Toggle::new(ConditionType::Boolean, new_has_it))
        }
        _ => None,
    }
}

/// Identical markup with exactly one text region empty on one side
fn nil_value(old_html: &str, new_html: &str) -> Option<Toggle> {
    let old_tags = scan_tags(old_html);
    let new_tags = scan_tags(new_html);
    if old_tags.is_empty() || old_tags.len() != new_tags.len() {
        return None;
    }
    if old_tags.iter().zip(&new_tags).any(|(a, b)| a.raw != b.raw) {
        return None;
    }

    let old_gaps = text_gaps(old_html, &old_tags);
    let new_gaps = text_gaps(new_html, &new_tags);
    let mut differing = old_gaps.iter().zip(&new_gaps).filter(|(a, b)| a != b);
    let (old_text, new_text) = differing.next()?;
    if differing.next().is_some() {
        return None;
    }
    match (old_text.trim().is_empty(), new_text.trim().is_empty()) {
        (true, false) => Some(Toggle::new(ConditionType::NilValue, true)),
        (false, true) => Some(Toggle::new(ConditionType::NilValue, false)),
        _ => None,
    }
}

/// Both sides are a single leaf element with different tag names
fn if_else(old_doc: &ParsedHtml, new_doc: &ParsedHtml) -> Option<Toggle> {
    let old_element = old_doc.single_element()?;
    let new_element = new_doc.single_element()?;
    if !is_leaf(old_element) || !is_leaf(new_element) {
        return None;
    }
    if old_element.name.eq_ignore_ascii_case(&new_element.name) {
        return None;
    }
    Some(Toggle::new(ConditionType::IfElse, true))
}
