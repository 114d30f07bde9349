use livepatch_config::ReplacementConfig;
use livepatch_core::html::{nesting_depth, normalize_whitespace, scan_tags, skeleton_fingerprint, text_content, Tag};
use livepatch_core::{Complexity, EncodingError, FragmentData, ReplacementData, Strategy};
use parking_lot::RwLock;
use similar::TextDiff;
use tracing::debug;

use super::{EncodeContext, FragmentEncoder};

/// Strategy 4: the whole new rendering, verbatim
///
/// Always succeeds. The complexity label and the normalized size are
/// telemetry only; the content must match the server's rendering byte for
/// byte, since later offset-based payloads patch it.
#[derive(Debug, Default)]
pub struct ReplacementEncoder {
    config: RwLock<ReplacementConfig>,
}

impl ReplacementEncoder {
    pub fn new(config: ReplacementConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    pub fn set_config(&self, config: ReplacementConfig) {
        *self.config.write() = config;
    }

    /// Full replacement payload for `new_html`
    pub fn replace(&self, old_html: &str, new_html: &str, reason: impl Into<String>) -> ReplacementData {
        if new_html.is_empty() {
            return ReplacementData {
                content: String::new(),
                complexity: Complexity::ComplexStructural,
                reason: reason.into(),
                is_empty: true,
            };
        }
        let complexity = self.complexity(old_html, new_html);
        debug!(
            %complexity,
            bytes = new_html.len(),
            normalized_bytes = normalize_whitespace(new_html).len(),
            "full replacement"
        );
        ReplacementData {
            content: new_html.to_string(),
            complexity,
            reason: reason.into(),
            is_empty: false,
        }
    }

    /// Label why a change needed full replacement
    pub fn complexity(&self, old_html: &str, new_html: &str) -> Complexity {
        let config = self.config.read().clone();

        if new_html.contains("{{") {
            return Complexity::TemplateFunctions;
        }
        if nesting_depth(old_html).abs_diff(nesting_depth(new_html)) > config.depth_threshold {
            return Complexity::RecursiveStructure;
        }

        let old_text = text_content(old_html);
        let new_text = text_content(new_html);
        let tags_changed = skeleton_fingerprint(old_html) != skeleton_fingerprint(new_html);
        let attributes_changed = attributes(old_html) != attributes(new_html);
        let text_changed = old_text != new_text;
        if tags_changed && attributes_changed && text_changed {
            return Complexity::MixedChanges;
        }

        let text_similarity = TextDiff::from_chars(old_text.as_str(), new_text.as_str()).ratio() as f64;
        let structural_difference = 1.0 - structural_similarity(old_html, new_html);
        if text_similarity < config.similarity_threshold && structural_difference > config.structural_threshold {
            return Complexity::Unpredictable;
        }

        Complexity::ComplexStructural
    }
}

/// Every attribute of every tag, in document order
fn attributes(html: &str) -> Vec<(String, Option<String>)> {
    scan_tags(html)
        .iter()
        .flat_map(Tag::attributes)
        .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
        .collect()
}

/// Similarity (0-1) of the bare tag sequences
fn structural_similarity(old_html: &str, new_html: &str) -> f64 {
    let lines = |html: &str| {
        scan_tags(html)
            .iter()
            .map(|tag| format!("{}\n", tag.bare()))
            .collect::<String>()
    };
    let (old_lines, new_lines) = (lines(old_html), lines(new_html));
    TextDiff::from_lines(old_lines.as_str(), new_lines.as_str()).ratio() as f64
}

impl FragmentEncoder for ReplacementEncoder {
    fn strategy(&self) -> Strategy {
        Strategy::Replacement
    }

    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError> {
        let reason = ctx
            .analysis
            .fallback_reason
            .clone()
            .unwrap_or_else(|| ctx.analysis.reason.clone());
        Ok(self.replace(ctx.old_html, ctx.new_html, reason).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("<p>a</p>", "<p>{{.Name}}</p>", Complexity::TemplateFunctions ; "template syntax")]
    #[test_case("<p>a</p>", "<div><div><div><div><div>a</div></div></div></div></div>", Complexity::RecursiveStructure ; "deep nesting")]
    #[test_case("<p class=\"a\">one</p>", "<div id=\"b\">two</div>", Complexity::MixedChanges ; "everything changed")]
    #[test_case("<div><p>Old</p></div>", "<article><h1>New</h1></article>", Complexity::Unpredictable ; "unrelated")]
    #[test_case("<ul><li>same text</li></ul>", "<ol><li>same text</li></ol>", Complexity::ComplexStructural ; "container swap")]
    fn test_complexity(old: &str, new: &str, expected: Complexity) {
        let encoder = ReplacementEncoder::default();
        assert_eq!(encoder.complexity(old, new), expected);
    }

    #[test]
    fn test_content_is_verbatim_and_idempotent() {
        let new = "\n<ul>\n  <li>a b</li>\n</ul>\n";
        let data = ReplacementEncoder::default().replace("<p>x</p>", new, "test");
        assert_eq!(data.content, new);
        assert_eq!(data.apply(), data.apply());
    }

    #[test]
    fn test_empty_new() {
        let data = ReplacementEncoder::default().replace("<p>x</p>", "", "gone");
        assert!(data.is_empty);
        assert!(data.content.is_empty());
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let encoder = ReplacementEncoder::default();
        let old = "<p>a</p>";
        let new = "<div><div><p>a</p></div></div>";
        assert_ne!(encoder.complexity(old, new), Complexity::RecursiveStructure);
        encoder.set_config(ReplacementConfig {
            depth_threshold: 1,
            ..ReplacementConfig::default()
        });
        assert_eq!(encoder.complexity(old, new), Complexity::RecursiveStructure);
    }
}
