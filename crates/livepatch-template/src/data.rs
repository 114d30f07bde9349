//! Data access and value formatting
//!
//! Templates read from [`serde_json::Value`]. Object keys are looked up
//! verbatim; a numeric segment indexes into an array.

use serde::Serialize;
use serde_json::Value;

use crate::error::{TemplateError, TemplateResult};

/// Read access to nested template data
pub trait DataAccessor {
    /// Follow `segments` from this value; `None` when any step is missing
    fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value>;
}

impl DataAccessor for Value {
    fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        let mut current = self;
        for segment in segments {
            let segment = segment.as_ref();
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Convert any serializable binding into template data
pub fn to_data<T: Serialize + ?Sized>(value: &T) -> TemplateResult<Value> {
    serde_json::to_value(value).map_err(|e| TemplateError::InvalidData {
        message: e.to_string(),
    })
}

/// Template truthiness: `false`, `0`, `null`, `""`, `[]` and `{}` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Unescaped text form of a value
///
/// `null` prints nothing, strings print raw, containers print compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
