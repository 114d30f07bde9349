//! Templates and rendering
//!
//! A small Go-template dialect: enough to drive server-rendered fragments and
//! to let the tree differ see where the dynamic parts of a template are.
//!
//! Supported actions:
//!
//! | Action | Meaning |
//! |---|---|
//! | `{{.Name}}`, `{{.User.Name}}` | field of the current context |
//! | `{{.}}` | the current context itself |
//! | `{{$.Title}}` | field of the root data |
//! | `{{if .X}}..{{else if .Y}}..{{else}}..{{end}}` | conditional |
//! | `{{if not .X}}` | negated condition |
//! | `{{range .Items}}..{{else}}..{{end}}` | loop, `.` bound to each element |
//! | `{{with .User}}..{{else}}..{{end}}` | rebind `.` when truthy |
//! | `{{/* comment */}}` | ignored |
//! | `{{- ` / ` -}}` | trim adjacent whitespace |
//!
//! Pipelines, functions, variables and `define`/`template`/`block` are
//! rejected at parse time with [`TemplateError::Unsupported`].
//!
//! ```rust,ignore
//! use livepatch_template::Template;
//! use serde_json::json;
//!
//! let template = Template::parse("greeting", "<p>Hello {{.Name}}</p>")?;
//! assert_eq!(template.render(&json!({"Name": "Ada"}))?, "<p>Hello Ada</p>");
//! ```

pub mod ast;
pub mod data;
pub mod error;
pub mod eval;
mod lexer;
mod parser;
pub mod render;

pub use ast::{Expr, FieldPath, Node, Template};
pub use data::{escape_html, format_value, is_truthy, to_data, DataAccessor};
pub use error::{TemplateError, TemplateResult};
pub use eval::Scope;
pub use render::{Renderer, TemplateRenderer};
