//! Expression evaluation against a data scope
//!
//! Shared by the string renderer and the tree differ so both agree on what a
//! template produces for a given piece of data.

use serde_json::Value;

use crate::ast::{Expr, FieldPath};
use crate::data::{escape_html, format_value, is_truthy, DataAccessor};
use crate::error::{TemplateError, TemplateResult};

/// Root data plus the current `.` binding
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub root: &'a Value,
    pub dot: &'a Value,
}

impl<'a> Scope<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root, dot: root }
    }

    pub fn with_dot(&self, dot: &'a Value) -> Self {
        Self { root: self.root, dot }
    }

    pub fn lookup(&self, path: &FieldPath) -> Option<&'a Value> {
        let base = if path.root { self.root } else { self.dot };
        base.resolve(&path.segments)
    }

    /// Truth value of a condition; missing fields are falsy
    pub fn truth(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Path(path) => self.lookup(path).is_some_and(is_truthy),
            Expr::Not(inner) => !self.truth(inner),
        }
    }

    /// Escaped output of an `{{expr}}` action
    pub fn output(&self, expr: &Expr) -> TemplateResult<String> {
        match expr {
            Expr::Path(path) => {
                let value = self.lookup(path).ok_or_else(|| TemplateError::FieldNotFound {
                    path: path.to_string(),
                })?;
                Ok(escape_html(&format_value(value)))
            }
            Expr::Not(inner) => Ok(escape_html(&(!self.truth(inner)).to_string())),
        }
    }

    /// Elements a `range` iterates; maps yield their values in key order
    pub fn items(&self, expr: &Expr) -> TemplateResult<Vec<&'a Value>> {
        let Expr::Path(path) = expr else {
            return Err(TemplateError::NotIterable { path: expr.to_string() });
        };
        match self.lookup(path) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().collect()),
            Some(Value::Object(map)) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                Ok(entries.into_iter().map(|(_, v)| v).collect())
            }
            Some(_) => Err(TemplateError::NotIterable { path: path.to_string() }),
        }
    }

    /// New `.` for a `with` block, or `None` when the else branch applies
    pub fn with_target(&self, expr: &Expr) -> Option<&'a Value> {
        match expr {
            Expr::Path(path) => self.lookup(path).filter(|value| is_truthy(value)),
            Expr::Not(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Expr {
        Expr::Path(FieldPath::relative(segments.iter().copied()))
    }

    #[test]
    fn test_root_vs_dot() {
        let data = json!({"Title": "T", "User": {"Name": "Ada"}});
        let user = data.resolve(&["User"]).unwrap();
        let scope = Scope::new(&data).with_dot(user);
        assert_eq!(scope.output(&path(&["Name"])).unwrap(), "Ada");
        let title = Expr::Path(FieldPath {
            root: true,
            segments: vec!["Title".into()],
        });
        assert_eq!(scope.output(&title).unwrap(), "T");
    }

    #[test]
    fn test_missing_field() {
        let data = json!({});
        let scope = Scope::new(&data);
        assert!(!scope.truth(&path(&["Missing"])));
        assert!(scope.truth(&Expr::Not(Box::new(path(&["Missing"])))));
        assert_eq!(
            scope.output(&path(&["Missing"])),
            Err(TemplateError::FieldNotFound {
                path: ".Missing".into()
            })
        );
    }

    #[test]
    fn test_items() {
        let data = json!({"List": [1, 2], "Map": {"b": 2, "a": 1}, "Scalar": 3});
        let scope = Scope::new(&data);
        assert_eq!(scope.items(&path(&["List"])).unwrap().len(), 2);
        let map_items = scope.items(&path(&["Map"])).unwrap();
        assert_eq!(map_items, vec![&json!(1), &json!(2)]);
        assert!(scope.items(&path(&["Missing"])).unwrap().is_empty());
        assert!(matches!(
            scope.items(&path(&["Scalar"])),
            Err(TemplateError::NotIterable { .. })
        ));
    }
}
