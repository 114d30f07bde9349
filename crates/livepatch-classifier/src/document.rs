//! Parsing rendered HTML for classification

use html_parser::{Dom, Element, Node};
use livepatch_core::html::{scan_tags, TagKind};
use livepatch_core::{ClassificationError, HtmlSide};

/// A rendering that passed the well-formedness checks
#[derive(Debug)]
pub(crate) struct ParsedHtml {
    /// `None` for inputs without markup
    dom: Option<Dom>,
}

impl ParsedHtml {
    pub(crate) fn parse(html: &str, side: HtmlSide) -> Result<Self, ClassificationError> {
        if !html.contains('<') {
            return Ok(Self { dom: None });
        }
        check_balanced(html, side)?;
        let dom = Dom::parse(html).map_err(|e| ClassificationError::unparsable(side, e.to_string()))?;
        Ok(Self { dom: Some(dom) })
    }

    /// The only top-level element, when there is exactly one and no loose text
    pub(crate) fn single_element(&self) -> Option<&Element> {
        let dom = self.dom.as_ref()?;
        let mut significant = dom.children.iter().filter(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Comment(_) => false,
            Node::Element(_) => true,
        });
        match (significant.next(), significant.next()) {
            (Some(Node::Element(element)), None) => Some(element),
            _ => None,
        }
    }
}

/// Element without child elements
pub(crate) fn is_leaf(element: &Element) -> bool {
    !element
        .children
        .iter()
        .any(|child| matches!(child, Node::Element(_)))
}

/// Every close tag must match the innermost open element and nothing may stay open
fn check_balanced(html: &str, side: HtmlSide) -> Result<(), ClassificationError> {
    let mut open: Vec<String> = Vec::new();
    for tag in scan_tags(html) {
        match tag.kind {
            TagKind::Open => open.push(tag.name),
            TagKind::Close => match open.pop() {
                Some(name) if name == tag.name => {}
                Some(name) => {
                    return Err(ClassificationError::unparsable(
                        side,
                        format!("</{}> closes <{name}> at byte {}", tag.name, tag.start),
                    ))
                }
                None => {
                    return Err(ClassificationError::unparsable(
                        side,
                        format!("stray </{}> at byte {}", tag.name, tag.start),
                    ))
                }
            },
            TagKind::Void | TagKind::Comment | TagKind::Declaration => {}
        }
    }
    match open.pop() {
        Some(name) => Err(ClassificationError::unparsable(side, format!("unclosed <{name}>"))),
        None => Ok(()),
    }
}
