//! Reference client for tree updates
//!
//! Mirrors what the browser runtime does: remember statics by skeleton hash,
//! splice dynamics between them, keep the last HTML for `{}` updates.

use livepatch_core::StructuralMismatchError;
use std::collections::HashMap;

use crate::node::{Tree, TreeNode};

#[derive(Debug, Clone, Default)]
pub struct TreeClient {
    fragment_id: String,
    statics: HashMap<String, Vec<String>>,
    html: String,
}

impl TreeClient {
    pub fn new(fragment_id: impl Into<String>) -> Self {
        Self {
            fragment_id: fragment_id.into(),
            ..Self::default()
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Number of skeletons whose statics are held
    pub fn known_skeletons(&self) -> usize {
        self.statics.len()
    }

    /// Drop held statics and HTML, as after a page reload
    pub fn reset(&mut self) {
        self.statics.clear();
        self.html.clear();
    }

    /// Apply one update and return the resulting HTML
    ///
    /// On error the previous HTML is kept.
    pub fn apply(&mut self, update: &Tree) -> Result<&str, StructuralMismatchError> {
        if !update.is_empty() {
            let mut out = String::new();
            self.render_tree(update, &mut out)?;
            self.html = out;
        }
        Ok(&self.html)
    }

    fn render_tree(&mut self, tree: &Tree, out: &mut String) -> Result<(), StructuralMismatchError> {
        let statics = match (&tree.statics, &tree.hash) {
            (Some(statics), Some(hash)) => {
                self.statics.insert(hash.clone(), statics.clone());
                statics.clone()
            }
            (Some(statics), None) => statics.clone(),
            (None, Some(hash)) => self.statics.get(hash).cloned().ok_or_else(|| {
                StructuralMismatchError::new(&self.fragment_id, hash.as_str(), "unknown skeleton")
            })?,
            (None, None) => {
                return Err(StructuralMismatchError::new(
                    &self.fragment_id,
                    "statics or skeleton hash",
                    "neither",
                ))
            }
        };

        if let Some((&key, _)) = tree.slots.range(statics.len().saturating_sub(1)..).next() {
            return Err(StructuralMismatchError::new(
                &self.fragment_id,
                format!("{} slots", statics.len().saturating_sub(1)),
                format!("slot {key}"),
            ));
        }

        for (index, text) in statics.iter().enumerate() {
            if index > 0 {
                if let Some(slot) = tree.slots.get(&(index - 1)) {
                    self.render_node(slot, out)?;
                }
            }
            out.push_str(text);
        }
        Ok(())
    }

    fn render_node(&mut self, node: &TreeNode, out: &mut String) -> Result<(), StructuralMismatchError> {
        match node {
            TreeNode::Leaf(value) => out.push_str(value),
            TreeNode::List(items) => {
                for item in items {
                    self.render_node(item, out)?;
                }
            }
            TreeNode::Tree(tree) => self.render_tree(tree, out)?,
        }
        Ok(())
    }
}
