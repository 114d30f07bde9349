use livepatch_core::html::{common_affixes, segments, Segment};
use livepatch_core::{EncodingError, FragmentData, MarkerPatchData, Strategy};
use tracing::trace;

use super::{EncodeContext, FragmentEncoder};

/// Strategy 2: byte-range patches into the previous rendering
///
/// When both renderings split into the same number of tag and text segments,
/// every differing segment gets its own patch. Otherwise one patch covers the
/// span between the common prefix and suffix, and that span may not cross a
/// tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerEncoder;

impl MarkerEncoder {
    fn build(&self, old: &str, new: &str) -> Result<MarkerPatchData, EncodingError> {
        if new.is_empty() {
            return Ok(MarkerPatchData::empty());
        }
        let mut data = MarkerPatchData::new();
        if old == new {
            return Ok(data);
        }
        if old.is_empty() {
            data.push(0, 0, new);
            return Ok(data);
        }

        let old_segments = segments(old);
        let new_segments = segments(new);
        if aligned(&old_segments, &new_segments) {
            for (old_segment, new_segment) in old_segments.iter().zip(&new_segments) {
                let (before, after) = (old_segment.as_str(), new_segment.as_str());
                if before == after {
                    continue;
                }
                let (offset, _) = old_segment.range();
                let affixes = common_affixes(before, after).snap_to_boundaries(before);
                let start = offset + affixes.prefix;
                let end = offset + before.len() - affixes.suffix;
                data.push(start, end, affixes.middle(after));
            }
            trace!(patches = data.patch_count(), "per-segment marker patches");
            return Ok(data);
        }

        let affixes = common_affixes(old, new).snap_to_boundaries(old);
        let (removed, inserted) = (affixes.middle(old), affixes.middle(new));
        if crosses_tag(removed) || crosses_tag(inserted) {
            return Err(EncodingError::unsupported(
                Strategy::Markers,
                "changed span crosses a tag boundary",
            ));
        }
        data.push(affixes.prefix, old.len() - affixes.suffix, inserted);
        Ok(data)
    }
}

/// Same segment count and the same tag/text alternation
fn aligned(old: &[Segment<'_>], new: &[Segment<'_>]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| a.is_tag() == b.is_tag())
}

fn crosses_tag(span: &str) -> bool {
    span.contains(['<', '>'])
}

impl FragmentEncoder for MarkerEncoder {
    fn strategy(&self) -> Strategy {
        Strategy::Markers
    }

    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError> {
        self.build(ctx.old_html, ctx.new_html).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_core::MarkerPosition;

    #[test]
    fn test_class_value_patch() {
        let old = r#"<div class="old">Content</div>"#;
        let new = r#"<div class="new">Content</div>"#;
        let data = MarkerEncoder.build(old, new).unwrap();
        assert_eq!(data.patch_count(), 1);
        assert_eq!(data.position_map[&0], MarkerPosition::new(12, 15));
        assert_eq!(data.value_updates[&0], "new");
        assert_eq!(data.apply(old).unwrap(), new);
    }

    #[test]
    fn test_multiple_segments() {
        let old = r#"<a href="/a" title="x">Alpha</a>"#;
        let new = r#"<a href="/b" title="y">Beta</a>"#;
        let data = MarkerEncoder.build(old, new).unwrap();
        assert_eq!(data.patch_count(), 2);
        assert_eq!(data.apply(old).unwrap(), new);
    }

    #[test]
    fn test_text_appearing_in_empty_element() {
        let old = "<p></p>";
        let new = "<p>now</p>";
        let data = MarkerEncoder.build(old, new).unwrap();
        assert_eq!(data.position_map[&0], MarkerPosition::new(3, 3));
        assert_eq!(data.apply(old).unwrap(), new);
    }

    #[test]
    fn test_span_crossing_tags_is_unsupported() {
        let err = MarkerEncoder.build("<p>a</p>", "<p>a</p><p>b</p>").unwrap_err();
        assert_eq!(err.strategy(), Strategy::Markers);
    }

    #[test]
    fn test_empty_states() {
        assert!(MarkerEncoder.build("<p>x</p>", "").unwrap().is_empty);
        assert!(MarkerEncoder.build("", "").unwrap().is_empty);
        let appear = MarkerEncoder.build("", "<p>x</p>").unwrap();
        assert!(!appear.is_empty);
        assert_eq!(appear.apply("").unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_no_change_has_no_patches() {
        let data = MarkerEncoder.build("<p>x</p>", "<p>x</p>").unwrap();
        assert_eq!(data.patch_count(), 0);
        assert_eq!(data.apply("<p>x</p>").unwrap(), "<p>x</p>");
    }
}
