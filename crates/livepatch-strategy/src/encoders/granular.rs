use livepatch_core::html::{common_affixes, scan_tags, single_root};
use livepatch_core::{DomOperation, EncodingError, FragmentData, GranularOpData, Strategy};
use tracing::trace;

use super::{EncodeContext, FragmentEncoder};

/// Selector used when the change is not scoped to one element
const ROOT_SELECTOR: &str = "root";

/// Strategy 3: one DOM operation per update
///
/// Checked in order: trailing append, leading prepend, append or prepend
/// inside an unchanged container, contiguous removal, contiguous insertion.
/// Anything else collapses to a single `replace`. That includes a new
/// rendering cut out of the middle of the old one: two separate ranges are
/// removed, which one operation cannot express.
#[derive(Debug, Default, Clone, Copy)]
pub struct GranularEncoder;

impl GranularEncoder {
    fn build(&self, old: &str, new: &str) -> GranularOpData {
        if new.is_empty() {
            return GranularOpData::empty();
        }
        let operation = if old.is_empty() {
            DomOperation::replace(ROOT_SELECTOR, new)
        } else {
            compile(old, new)
        };
        trace!(kind = ?operation.kind, selector = %operation.selector, "granular operation");
        GranularOpData::single(operation)
    }
}

fn compile(old: &str, new: &str) -> DomOperation {
    if old == new {
        return DomOperation::replace(ROOT_SELECTOR, new);
    }

    if let Some(suffix) = new.strip_prefix(old) {
        return DomOperation::append(selector_of(suffix), suffix, old.len());
    }
    if let Some(prefix) = new.strip_suffix(old) {
        return DomOperation::prepend(selector_of(prefix), prefix, 0);
    }

    if let (Some(old_root), Some(new_root)) = (single_root(old), single_root(new)) {
        if old_root.open == new_root.open && old_root.close == new_root.close {
            if let Some(added) = new_root.inner.strip_prefix(old_root.inner) {
                return DomOperation::append(
                    new_root.name.clone(),
                    added,
                    old.len() - old_root.close.len(),
                );
            }
            if let Some(added) = new_root.inner.strip_suffix(old_root.inner) {
                return DomOperation::prepend(new_root.name.clone(), added, old_root.open.len());
            }
        }
    }

    let affixes = common_affixes(old, new);
    let removed = affixes.middle(old);
    let inserted = affixes.middle(new);
    if inserted.is_empty() && !removed.is_empty() {
        return DomOperation::remove(selector_of(removed), removed, affixes.prefix);
    }
    if removed.is_empty() && !inserted.is_empty() {
        return DomOperation::insert(selector_of(inserted), inserted, affixes.prefix);
    }

    DomOperation::replace(ROOT_SELECTOR, new)
}

/// Name of the first element in `html`, or the root selector
fn selector_of(html: &str) -> String {
    scan_tags(html)
        .into_iter()
        .find(|tag| !tag.name.is_empty())
        .map_or_else(|| ROOT_SELECTOR.to_string(), |tag| tag.name)
}

impl FragmentEncoder for GranularEncoder {
    fn strategy(&self) -> Strategy {
        Strategy::Granular
    }

    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError> {
        Ok(self.build(ctx.old_html, ctx.new_html).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_core::OperationType;

    fn single(old: &str, new: &str) -> DomOperation {
        let data = GranularEncoder.build(old, new);
        assert_eq!(data.apply(old).unwrap(), new, "round trip {old:?} -> {new:?}");
        assert_eq!(data.operations.len(), 1);
        data.operations[0].clone()
    }

    #[test]
    fn test_container_append() {
        let op = single("<ul><li>Item 1</li></ul>", "<ul><li>Item 1</li><li>Item 2</li></ul>");
        assert_eq!(op.kind, OperationType::Append);
        assert_eq!(op.selector, "ul");
        assert_eq!(op.content.as_deref(), Some("<li>Item 2</li>"));
    }

    #[test]
    fn test_container_prepend() {
        let op = single("<ul><li>b</li></ul>", "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(op.kind, OperationType::Prepend);
        assert_eq!(op.index, Some(4));
    }

    #[test]
    fn test_trailing_append() {
        let op = single("<p>a</p>", "<p>a</p><p>b</p>");
        assert_eq!(op.kind, OperationType::Append);
        assert_eq!(op.selector, "p");
    }

    #[test]
    fn test_leading_prepend() {
        let op = single("<p>b</p>", "<p>a</p><p>b</p>");
        assert_eq!(op.kind, OperationType::Prepend);
        assert_eq!(op.index, Some(0));
    }

    #[test]
    fn test_remove_from_middle() {
        let op = single(
            "<ul><li>a</li><li>b</li><li>c</li></ul>",
            "<ul><li>a</li><li>c</li></ul>",
        );
        assert_eq!(op.kind, OperationType::Remove);
        assert_eq!(op.selector, "li");
    }

    #[test]
    fn test_insert_in_middle() {
        let op = single(
            "<ul><li>a</li><li>c</li></ul>",
            "<ul><li>a</li><li>b</li><li>c</li></ul>",
        );
        assert_eq!(op.kind, OperationType::Insert);
    }

    #[test]
    fn test_multi_edit_collapses_to_replace() {
        let op = single("<ul><li>a</li><li>b</li></ul>", "<ul><li>x</li><li>b</li><li>c</li></ul>");
        assert_eq!(op.kind, OperationType::Replace);
    }

    #[test]
    fn test_removal_from_one_end_is_a_remove() {
        let op = single("<li>a</li><li>b</li>", "<li>b</li>");
        assert_eq!(op.kind, OperationType::Remove);
        assert_eq!(op.content.as_deref(), Some("<li>a</li>"));
    }

    #[test]
    fn test_cut_from_the_middle_is_a_replace() {
        let op = single("<ul><li>a</li><li>b</li><li>c</li></ul>", "<li>b</li>");
        assert_eq!(op.kind, OperationType::Replace);
        assert_eq!(op.content.as_deref(), Some("<li>b</li>"));
    }

    #[test]
    fn test_empty_states() {
        assert!(GranularEncoder.build("<p>x</p>", "").is_empty);
        let nothing = GranularEncoder.build("", "");
        assert!(nothing.is_empty);
        assert!(nothing.operations.is_empty());
        let appear = single("", "<p>x</p>");
        assert_eq!(appear.kind, OperationType::Replace);
    }
}
