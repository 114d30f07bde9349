//! Lightweight HTML scanning
//!
//! These helpers work on byte offsets into the original string so encoders can
//! address positions in previously sent HTML. They do not build a DOM; full
//! parsing is the classifier's job.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|</?([A-Za-z][A-Za-z0-9:._-]*)(?:"[^"]*"|'[^']*'|[^'">])*>"#,
    )
    .expect("tag pattern is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:@][-A-Za-z0-9_:.@]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#)
        .expect("attribute pattern is valid")
});

static INTER_TAG_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("whitespace pattern is valid"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Characters that end a marker span: whitespace, angle brackets and quotes
pub fn is_boundary_byte(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'<' | b'>' | b'"' | b'\'')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    /// Void element or explicit `/>`
    Void,
    Comment,
    /// `<!DOCTYPE ...>` and friends
    Declaration,
}

/// One tag located in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub start: usize,
    pub end: usize,
    pub raw: &'a str,
    /// Lowercased element name, empty for comments and declarations
    pub name: String,
    pub kind: TagKind,
}

impl<'a> Tag<'a> {
    /// Tag with attributes stripped, e.g. `<div>` or `</div>`
    pub fn bare(&self) -> String {
        match self.kind {
            TagKind::Open => format!("<{}>", self.name),
            TagKind::Close => format!("</{}>", self.name),
            TagKind::Void => format!("<{}/>", self.name),
            TagKind::Comment => "<!---->".to_string(),
            TagKind::Declaration => "<!>".to_string(),
        }
    }

    /// Attributes of an open or void tag, in source order
    pub fn attributes(&self) -> Vec<(&'a str, Option<&'a str>)> {
        if !matches!(self.kind, TagKind::Open | TagKind::Void) {
            return Vec::new();
        }
        // skip "<name"
        let body = &self.raw[1 + self.name.len()..];
        let body = body.trim_end_matches('>').trim_end_matches('/');
        ATTR_RE
            .captures_iter(body)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str();
                let value = caps
                    .get(2)
                    .map(|v| v.as_str().trim_matches(|c| c == '"' || c == '\''));
                Some((name, value))
            })
            .collect()
    }
}

/// Locate every tag in `html`
pub fn scan_tags(html: &str) -> Vec<Tag<'_>> {
    TAG_RE
        .find_iter(html)
        .map(|m| {
            let raw = m.as_str();
            let (name, kind) = if raw.starts_with("<!--") {
                (String::new(), TagKind::Comment)
            } else if raw.starts_with("<!") {
                (String::new(), TagKind::Declaration)
            } else {
                let closing = raw.starts_with("</");
                let name_start = if closing { 2 } else { 1 };
                let name: String = raw[name_start..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-'))
                    .collect::<String>()
                    .to_ascii_lowercase();
                let kind = if closing {
                    TagKind::Close
                } else if raw.ends_with("/>") || is_void_element(&name) {
                    TagKind::Void
                } else {
                    TagKind::Open
                };
                (name, kind)
            };
            Tag {
                start: m.start(),
                end: m.end(),
                raw,
                name,
                kind,
            }
        })
        .collect()
}

/// Alternating text and tag pieces covering the whole input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text { start: usize, end: usize, text: &'a str },
    Tag(Tag<'a>),
}

impl Segment<'_> {
    pub fn range(&self) -> (usize, usize) {
        match self {
            Self::Text { start, end, .. } => (*start, *end),
            Self::Tag(tag) => (tag.start, tag.end),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Tag(tag) => tag.raw,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

/// Split `html` into text and tag segments. Empty text runs are omitted.
pub fn segments(html: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for tag in scan_tags(html) {
        if tag.start > cursor {
            out.push(Segment::Text {
                start: cursor,
                end: tag.start,
                text: &html[cursor..tag.start],
            });
        }
        cursor = tag.end;
        out.push(Segment::Tag(tag));
    }
    if cursor < html.len() {
        out.push(Segment::Text {
            start: cursor,
            end: html.len(),
            text: &html[cursor..],
        });
    }
    out
}

/// Tag skeleton fingerprint: every non-tag character stripped, attributes dropped
pub fn skeleton_fingerprint(html: &str) -> String {
    scan_tags(html).iter().map(Tag::bare).collect()
}

/// All tags concatenated verbatim, attributes included
pub fn tag_signature(html: &str) -> String {
    scan_tags(html).iter().map(|tag| tag.raw).collect()
}

/// Concatenated text between tags
pub fn text_content(html: &str) -> String {
    segments(html)
        .iter()
        .filter_map(|segment| match segment {
            Segment::Text { text, .. } => Some(*text),
            Segment::Tag(_) => None,
        })
        .collect()
}

/// Maximum element nesting depth
pub fn nesting_depth(html: &str) -> usize {
    let mut depth: usize = 0;
    let mut max = 0;
    for tag in scan_tags(html) {
        match tag.kind {
            TagKind::Open => {
                depth += 1;
                max = max.max(depth);
            }
            TagKind::Close => depth = depth.saturating_sub(1),
            TagKind::Void => max = max.max(depth + 1),
            TagKind::Comment | TagKind::Declaration => {}
        }
    }
    max
}

/// Number of top-level elements (open or void tags at depth zero)
pub fn root_element_count(html: &str) -> usize {
    let mut depth: usize = 0;
    let mut count = 0;
    for tag in scan_tags(html) {
        match tag.kind {
            TagKind::Open => {
                if depth == 0 {
                    count += 1;
                }
                depth += 1;
            }
            TagKind::Close => depth = depth.saturating_sub(1),
            TagKind::Void if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

/// A single element split into its open tag, inner content and close tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementParts<'a> {
    pub name: String,
    pub open: &'a str,
    pub inner: &'a str,
    pub close: &'a str,
}

/// Split `html` if it is exactly one non-void element with no surrounding text
pub fn single_root(html: &str) -> Option<ElementParts<'_>> {
    let tags = scan_tags(html);
    let first = tags.first()?;
    let last = tags.last()?;
    if first.start != 0 || last.end != html.len() || first.kind != TagKind::Open {
        return None;
    }
    if last.kind != TagKind::Close || last.name != first.name {
        return None;
    }
    // the first open must only be closed by the last tag
    let mut depth: usize = 0;
    for (i, tag) in tags.iter().enumerate() {
        match tag.kind {
            TagKind::Open => depth += 1,
            TagKind::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != tags.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(ElementParts {
        name: first.name.clone(),
        open: first.raw,
        inner: &html[first.end..last.start],
        close: last.raw,
    })
}

/// Collapse whitespace between tags; whitespace inside text is preserved
pub fn normalize_whitespace(html: &str) -> String {
    INTER_TAG_WS_RE.replace_all(html.trim(), "><").into_owned()
}

/// Lengths of the common prefix and suffix of two strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affixes {
    pub prefix: usize,
    pub suffix: usize,
}

impl Affixes {
    /// Changed middle of `s` given these affixes
    pub fn middle<'a>(&self, s: &'a str) -> &'a str {
        &s[self.prefix..s.len() - self.suffix]
    }

    /// Widen the changed middle outward to the nearest boundary bytes
    ///
    /// Afterwards the prefix ends right after a boundary (or at 0) and the
    /// suffix starts on a boundary (or is empty). `s` may be either of the two
    /// strings the affixes were computed from: the bytes inspected lie in the
    /// shared regions.
    pub fn snap_to_boundaries(self, s: &str) -> Affixes {
        let bytes = s.as_bytes();
        let mut prefix = self.prefix;
        while prefix > 0 && !is_boundary_byte(bytes[prefix - 1]) {
            prefix -= 1;
        }
        let mut suffix = self.suffix;
        while suffix > 0 && !is_boundary_byte(bytes[s.len() - suffix]) {
            suffix -= 1;
        }
        Affixes { prefix, suffix }
    }
}

/// Longest common prefix and suffix, clamped so they never overlap
///
/// When the two would overlap in the shorter string the prefix shrinks first.
/// Both lengths always fall on UTF-8 character boundaries of both strings.
pub fn common_affixes(a: &str, b: &str) -> Affixes {
    let (ab, bb) = (a.as_bytes(), b.as_bytes());
    let max = ab.len().min(bb.len());

    let mut prefix = ab.iter().zip(bb).take_while(|(x, y)| x == y).count();
    while !(a.is_char_boundary(prefix) && b.is_char_boundary(prefix)) {
        prefix -= 1;
    }

    let mut suffix = ab
        .iter()
        .rev()
        .zip(bb.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    while !(a.is_char_boundary(a.len() - suffix) && b.is_char_boundary(b.len() - suffix)) {
        suffix -= 1;
    }

    if prefix + suffix > max {
        prefix = max - suffix;
        while !(a.is_char_boundary(prefix) && b.is_char_boundary(prefix)) {
            prefix -= 1;
        }
    }

    Affixes { prefix, suffix }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_tags_kinds() {
        let html = r#"<!DOCTYPE html><div class="a>b"><br><img src="x"/><!-- c --></div>"#;
        let kinds: Vec<TagKind> = scan_tags(html).iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TagKind::Declaration,
                TagKind::Open,
                TagKind::Void,
                TagKind::Void,
                TagKind::Comment,
                TagKind::Close
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let tags = scan_tags(r#"<input type="checkbox" checked disabled data-id='7'>"#);
        let attrs = tags[0].attributes();
        assert_eq!(
            attrs,
            vec![
                ("type", Some("checkbox")),
                ("checked", None),
                ("disabled", None),
                ("data-id", Some("7")),
            ]
        );
    }

    #[test]
    fn test_skeleton_fingerprint_ignores_text_and_attributes() {
        assert_eq!(
            skeleton_fingerprint(r#"<div class="x">Hello <b>you</b></div>"#),
            skeleton_fingerprint(r#"<div class="y">Bye <b>me</b></div>"#)
        );
        assert_eq!(skeleton_fingerprint("<div>Hi</div>"), "<div></div>");
    }

    #[test]
    fn test_segments_cover_input() {
        let html = "a<b>c</b>d";
        let rebuilt: String = segments(html).iter().map(Segment::as_str).collect();
        assert_eq!(rebuilt, html);
        assert_eq!(segments(html).len(), 5);
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nesting_depth("text"), 0);
        assert_eq!(nesting_depth("<div><p><b>x</b></p></div>"), 3);
        assert_eq!(nesting_depth("<div><br></div>"), 2);
    }

    #[test]
    fn test_single_root() {
        let parts = single_root("<ul><li>1</li></ul>").unwrap();
        assert_eq!(parts.open, "<ul>");
        assert_eq!(parts.inner, "<li>1</li>");
        assert_eq!(parts.close, "</ul>");
        assert!(single_root("<li>1</li><li>2</li>").is_none());
        assert!(single_root("x<p></p>").is_none());
    }

    #[test]
    fn test_root_element_count() {
        assert_eq!(root_element_count("<li>1</li><li>2</li>"), 2);
        assert_eq!(root_element_count("<ul><li>1</li></ul>"), 1);
        assert_eq!(root_element_count("plain"), 0);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  <div>\n  <p>Hello  world</p>\n</div> "),
            "<div><p>Hello  world</p></div>"
        );
    }

    #[test]
    fn test_common_affixes_basic() {
        let a = common_affixes("<div>Hello</div>", "<div>Hi there</div>");
        assert_eq!(a.prefix, 6);
        assert_eq!(a.suffix, 6);
        assert_eq!(a.middle("<div>Hi there</div>"), "i there");
    }

    #[test]
    fn test_snap_to_boundaries() {
        let old = "<div>Hello</div>";
        let new = "<div>Hi there</div>";
        let snapped = common_affixes(old, new).snap_to_boundaries(new);
        assert_eq!(snapped.middle(old), "Hello");
        assert_eq!(snapped.middle(new), "Hi there");

        let old = r#"<div class="old">Content</div>"#;
        let new = r#"<div class="new">Content</div>"#;
        let snapped = common_affixes(old, new).snap_to_boundaries(old);
        assert_eq!(snapped.middle(old), "old");
    }

    #[test]
    fn test_common_affixes_shrinks_prefix_first() {
        // "aa" -> "aaa": prefix 2 and suffix 2 overlap in the shorter string
        let a = common_affixes("aa", "aaa");
        assert_eq!(a, Affixes { prefix: 0, suffix: 2 });
    }

    #[test]
    fn test_common_affixes_respects_char_boundaries() {
        let a = common_affixes("é", "è");
        assert_eq!(a, Affixes { prefix: 0, suffix: 0 });
        let a = common_affixes("xéy", "xèy");
        assert_eq!(a.middle("xéy"), "é");
        assert_eq!(a.middle("xèy"), "è");
    }
}
