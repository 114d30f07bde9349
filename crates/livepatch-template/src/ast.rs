//! Parsed template structure

use livepatch_core::short_hash;
use std::fmt;

use crate::error::TemplateResult;
use crate::parser;

/// Path to a value: `.A.B` (relative to the current context) or `$.A.B` (from the root)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub root: bool,
    pub segments: Vec<String>,
}

impl FieldPath {
    pub fn dot() -> Self {
        Self {
            root: false,
            segments: Vec::new(),
        }
    }

    pub fn relative<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: false,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = if self.root { "$" } else { "" };
        if self.segments.is_empty() {
            return f.write_str(if self.root { "$" } else { "." });
        }
        write!(f, "{base}.{}", self.segments.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Path(FieldPath),
    Not(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => path.fmt(f),
            Self::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Text(String),
    /// `{{expr}}` output action
    Output(Expr),
    If {
        cond: Expr,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        expr: Expr,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
    With {
        expr: Expr,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

impl Node {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    source: String,
    nodes: Vec<Node>,
    fingerprint: String,
}

impl Template {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> TemplateResult<Self> {
        let name = name.into();
        let source = source.into();
        let nodes = parser::parse(&source)?;
        let fingerprint = short_hash(&[name.as_str(), source.as_str()]);
        Ok(Self {
            name,
            source,
            nodes,
            fingerprint,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Hash of name and source; changes whenever the template text changes
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
