//! Compiling templates into skeletons
//!
//! A block is a run of template nodes: its text nodes become statics and every
//! other node becomes a dynamic slot between two statics. Conditionals, loops
//! and `with` blocks compile their bodies into nested blocks, so every branch
//! a template can take has its statics known up front. The tree differ relies
//! on that to send an unseen branch's statics the first time it renders.

use livepatch_core::short_hash;
use livepatch_template::{Expr, Node, Scope, Template, TemplateResult};
use std::collections::{BTreeMap, HashMap};

use crate::node::{Tree, TreeNode};

#[derive(Debug, Clone)]
pub(crate) struct Block {
    statics: Vec<String>,
    hash: String,
    slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
enum Slot {
    Output(Expr),
    If {
        cond: Expr,
        then: Block,
        otherwise: Block,
    },
    Range {
        expr: Expr,
        body: Block,
        otherwise: Block,
    },
    With {
        expr: Expr,
        body: Block,
        otherwise: Block,
    },
}

impl Block {
    fn compile(nodes: &[Node], registry: &mut HashMap<String, Vec<String>>) -> Self {
        let mut statics = vec![String::new()];
        let mut slots = Vec::new();

        for node in nodes {
            let slot = match node {
                Node::Text(text) => {
                    if let Some(last) = statics.last_mut() {
                        last.push_str(text);
                    }
                    continue;
                }
                Node::Output(expr) => Slot::Output(expr.clone()),
                Node::If { cond, then, otherwise } => Slot::If {
                    cond: cond.clone(),
                    then: Self::compile(then, registry),
                    otherwise: Self::compile(otherwise, registry),
                },
                Node::Range { expr, body, otherwise } => Slot::Range {
                    expr: expr.clone(),
                    body: Self::compile(body, registry),
                    otherwise: Self::compile(otherwise, registry),
                },
                Node::With { expr, body, otherwise } => Slot::With {
                    expr: expr.clone(),
                    body: Self::compile(body, registry),
                    otherwise: Self::compile(otherwise, registry),
                },
            };
            slots.push(slot);
            statics.push(String::new());
        }

        let hash = short_hash(&statics);
        registry.entry(hash.clone()).or_insert_with(|| statics.clone());
        Self { statics, hash, slots }
    }

    /// Dynamics-only tree for this block under `scope`
    fn evaluate(&self, scope: Scope<'_>) -> TemplateResult<Tree> {
        let mut slots = BTreeMap::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let node = match slot {
                Slot::Output(expr) => TreeNode::Leaf(scope.output(expr)?),
                Slot::If { cond, then, otherwise } => {
                    let branch = if scope.truth(cond) { then } else { otherwise };
                    branch.evaluate(scope)?.into()
                }
                Slot::Range { expr, body, otherwise } => {
                    let items = scope.items(expr)?;
                    if items.is_empty() {
                        otherwise.evaluate(scope)?.into()
                    } else {
                        TreeNode::List(
                            items
                                .into_iter()
                                .map(|item| body.evaluate(scope.with_dot(item)).map(TreeNode::from))
                                .collect::<TemplateResult<_>>()?,
                        )
                    }
                }
                Slot::With { expr, body, otherwise } => match scope.with_target(expr) {
                    Some(target) => body.evaluate(scope.with_dot(target))?.into(),
                    None => otherwise.evaluate(scope)?.into(),
                },
            };
            slots.insert(index, node);
        }
        Ok(Tree {
            statics: None,
            hash: Some(self.hash.clone()),
            slots,
        })
    }

    fn block_count(&self) -> usize {
        1 + self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Output(_) => 0,
                Slot::If { then: a, otherwise: b, .. }
                | Slot::Range { body: a, otherwise: b, .. }
                | Slot::With { body: a, otherwise: b, .. } => a.block_count() + b.block_count(),
            })
            .sum::<usize>()
    }
}

/// A compiled template: root block plus the statics of every block by hash
#[derive(Debug, Clone)]
pub struct Skeleton {
    fingerprint: String,
    root: Block,
    statics: HashMap<String, Vec<String>>,
}

impl Skeleton {
    pub fn compile(template: &Template) -> Self {
        let mut statics = HashMap::new();
        let root = Block::compile(template.nodes(), &mut statics);
        Self {
            fingerprint: template.fingerprint().to_string(),
            root,
            statics,
        }
    }

    /// Fingerprint of the template this skeleton was compiled from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn root_hash(&self) -> &str {
        &self.root.hash
    }

    /// Number of blocks, counting every branch of every conditional
    pub fn block_count(&self) -> usize {
        self.root.block_count()
    }

    pub fn statics(&self, hash: &str) -> Option<&[String]> {
        self.statics.get(hash).map(Vec::as_slice)
    }

    /// Evaluate every slot against `data`; no statics are attached
    pub fn evaluate(&self, data: &serde_json::Value) -> TemplateResult<Tree> {
        self.root.evaluate(Scope::new(data))
    }

    /// Attach statics for every skeleton hash not yet in `sent`, recording them
    ///
    /// Walks the tree depth first in slot order, which is the order a client
    /// renders in, so the first occurrence of a hash always carries `s`.
    pub fn attach_statics<F>(&self, tree: &mut Tree, needs_statics: &mut F)
    where
        F: FnMut(&str) -> bool,
    {
        if let Some(hash) = tree.hash.as_deref() {
            if needs_statics(hash) {
                tree.statics = self.statics(hash).map(<[String]>::to_vec);
            }
        }
        for slot in tree.slots.values_mut() {
            self.attach_node(slot, needs_statics);
        }
    }

    fn attach_node<F>(&self, node: &mut TreeNode, needs_statics: &mut F)
    where
        F: FnMut(&str) -> bool,
    {
        match node {
            TreeNode::Leaf(_) => {}
            TreeNode::List(items) => {
                for item in items {
                    self.attach_node(item, needs_statics);
                }
            }
            TreeNode::Tree(tree) => self.attach_statics(tree, needs_statics),
        }
    }
}
