//! Wire representation of skeleton/dynamics trees
//!
//! A tree is one flat JSON object per skeleton instance:
//!
//! ```json
//! {"s": ["<p>", "</p>"], "h": "9f2c4e01aa07b3d5", "0": "Ada"}
//! ```
//!
//! `s` holds the statics (only when the client does not have them yet), `h`
//! identifies the skeleton, and the stringified integer keys are the dynamic
//! slots that go between adjacent statics. A slot is a string, a nested tree
//! or a list of trees. `{}` means "nothing changed".

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

const STATICS_KEY: &str = "s";
const HASH_KEY: &str = "h";

/// One dynamic slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf(String),
    List(Vec<TreeNode>),
    Tree(Tree),
}

impl From<Tree> for TreeNode {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

/// Statics, skeleton hash and slots of one skeleton instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub statics: Option<Vec<String>>,
    pub hash: Option<String>,
    pub slots: BTreeMap<usize, TreeNode>,
}

impl Tree {
    /// The "no client action" tree, `{}` on the wire
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.statics.is_none() && self.hash.is_none() && self.slots.is_empty()
    }

    /// True if any node at any depth carries statics
    pub fn contains_statics(&self) -> bool {
        self.statics.is_some() || self.slots.values().any(TreeNode::contains_statics)
    }

    /// Every slot key is below `statics.len() - 1` wherever statics are present
    pub fn slots_interleave(&self) -> bool {
        let bounded = match &self.statics {
            Some(statics) => self
                .slots
                .keys()
                .all(|&key| key + 1 < statics.len()),
            None => true,
        };
        bounded && self.slots.values().all(TreeNode::slots_interleave)
    }
}

impl TreeNode {
    fn contains_statics(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::List(items) => items.iter().any(Self::contains_statics),
            Self::Tree(tree) => tree.contains_statics(),
        }
    }

    fn slots_interleave(&self) -> bool {
        match self {
            Self::Leaf(_) => true,
            Self::List(items) => items.iter().all(Self::slots_interleave),
            Self::Tree(tree) => tree.slots_interleave(),
        }
    }
}

impl Serialize for Tree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.slots.len()
            + usize::from(self.statics.is_some())
            + usize::from(self.hash.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(statics) = &self.statics {
            map.serialize_entry(STATICS_KEY, statics)?;
        }
        if let Some(hash) = &self.hash {
            map.serialize_entry(HASH_KEY, hash)?;
        }
        for (key, slot) in &self.slots {
            map.serialize_entry(&key.to_string(), slot)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;

        let statics = map
            .remove(STATICS_KEY)
            .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
            .transpose()?;
        let hash = map
            .remove(HASH_KEY)
            .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
            .transpose()?;

        let mut slots = BTreeMap::new();
        for (key, value) in map {
            let index: usize = key
                .parse()
                .map_err(|_| D::Error::custom(format!("unexpected tree key {key:?}")))?;
            let node = serde_json::from_value(value).map_err(D::Error::custom)?;
            slots.insert(index, node);
        }

        Ok(Tree {
            statics,
            hash,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Tree {
        Tree {
            statics: Some(vec!["<ul>".into(), "</ul>".into()]),
            hash: Some("abc".into()),
            slots: BTreeMap::from([(
                0,
                TreeNode::List(vec![TreeNode::Tree(Tree {
                    statics: Some(vec!["<li>".into(), "</li>".into()]),
                    hash: Some("def".into()),
                    slots: BTreeMap::from([(0, TreeNode::Leaf("a".into()))]),
                })]),
            )]),
        }
    }

    #[test]
    fn test_flat_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "s": ["<ul>", "</ul>"],
                "h": "abc",
                "0": [{"s": ["<li>", "</li>"], "h": "def", "0": "a"}]
            })
        );
        assert_eq!(serde_json::to_string(&Tree::empty()).unwrap(), "{}");
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let tree: Tree = serde_json::from_value(serde_json::to_value(sample()).unwrap()).unwrap();
        assert_eq!(tree, sample());
        let empty: Tree = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(serde_json::from_value::<Tree>(json!({"h": "x", "dynamics": {}})).is_err());
    }

    #[test]
    fn test_statics_and_interleaving() {
        let mut tree = sample();
        assert!(tree.contains_statics());
        assert!(tree.slots_interleave());

        tree.slots.insert(1, TreeNode::Leaf("extra".into()));
        assert!(!tree.slots_interleave());

        let dynamics_only = Tree {
            statics: None,
            hash: Some("abc".into()),
            slots: BTreeMap::from([(0, TreeNode::Leaf("x".into()))]),
        };
        assert!(!dynamics_only.contains_statics());
    }
}
