//! Rendering templates to HTML strings

use serde_json::Value;
use tracing::trace;

use crate::ast::{Node, Template};
use crate::error::TemplateResult;
use crate::eval::Scope;

/// Turns a template plus data into HTML
///
/// The update generator only talks to this trait, so hosts can plug in their
/// own engine.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &Template, data: &Value) -> TemplateResult<String>;
}

/// Renderer for the built-in template dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &Template, data: &Value) -> TemplateResult<String> {
        template.render(data)
    }
}

impl Template {
    pub fn render(&self, data: &Value) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.source().len());
        render_nodes(self.nodes(), Scope::new(data), &mut out)?;
        trace!(template = self.name(), bytes = out.len(), "rendered template");
        Ok(out)
    }
}

fn render_nodes(nodes: &[Node], scope: Scope<'_>, out: &mut String) -> TemplateResult<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) => out.push_str(&scope.output(expr)?),
            Node::If { cond, then, otherwise } => {
                let branch = if scope.truth(cond) { then } else { otherwise };
                render_nodes(branch, scope, out)?;
            }
            Node::Range { expr, body, otherwise } => {
                let items = scope.items(expr)?;
                if items.is_empty() {
                    render_nodes(otherwise, scope, out)?;
                }
                for item in items {
                    render_nodes(body, scope.with_dot(item), out)?;
                }
            }
            Node::With { expr, body, otherwise } => match scope.with_target(expr) {
                Some(target) => render_nodes(body, scope.with_dot(target), out)?,
                None => render_nodes(otherwise, scope, out)?,
            },
        }
    }
    Ok(())
}
