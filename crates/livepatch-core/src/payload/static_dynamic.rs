use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EncodingError;
use crate::hash::short_hash;
use crate::strategy::{ConditionType, Strategy};

/// Both branch renderings of a conditional slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalSlot {
    pub condition_type: ConditionType,
    pub truthy_value: String,
    pub falsy_value: String,
    /// Whether the branch values are whole elements rather than inline text
    pub is_full_element: bool,
}

impl ConditionalSlot {
    pub fn select(&self, truthy: bool) -> &str {
        if truthy {
            &self.truthy_value
        } else {
            &self.falsy_value
        }
    }
}

/// Strategy 1 payload: ordered statics interleaved with dynamic slots
///
/// On the wire this is one flat object: statics under `s`, the skeleton hash
/// under `h`, and dynamic values under `"0"`, `"1"`, ... at the same level.
/// `s` is omitted when the client already holds the skeleton for `h`.
///
/// A conditional slot stores `"true"` or `"false"` as its dynamic value and
/// the client picks the matching branch from `conditionals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StaticDynamicWire", try_from = "StaticDynamicWire")]
pub struct StaticDynamicData {
    pub statics: Option<Vec<String>>,
    pub skeleton_hash: String,
    pub dynamics: BTreeMap<usize, String>,
    pub conditionals: BTreeMap<usize, ConditionalSlot>,
    pub is_empty: bool,
}

impl StaticDynamicData {
    pub fn new(statics: Vec<String>, dynamics: BTreeMap<usize, String>) -> Self {
        Self {
            skeleton_hash: short_hash(&statics),
            statics: Some(statics),
            dynamics,
            conditionals: BTreeMap::new(),
            is_empty: false,
        }
    }

    /// Payload telling the client the fragment is now empty
    pub fn empty() -> Self {
        let statics: Vec<String> = Vec::new();
        Self {
            skeleton_hash: short_hash(&statics),
            statics: Some(statics),
            dynamics: BTreeMap::new(),
            conditionals: BTreeMap::new(),
            is_empty: true,
        }
    }

    /// Single conditional slot between two statics
    pub fn conditional(
        prefix: String,
        suffix: String,
        slot: ConditionalSlot,
        truthy: bool,
    ) -> Self {
        let mut data = Self::new(
            vec![prefix, suffix],
            BTreeMap::from([(0, truthy.to_string())]),
        );
        data.conditionals.insert(0, slot);
        data
    }

    /// Drop statics because the client already caches them under `skeleton_hash`
    pub fn without_statics(mut self) -> Self {
        self.statics = None;
        self
    }

    /// Number of dynamic slots the skeleton has room for
    pub fn slot_count(&self) -> Option<usize> {
        self.statics.as_ref().map(|s| s.len().saturating_sub(1))
    }

    /// Rebuild the HTML from statics (own or cached) and dynamics
    pub fn apply(&self, cached_statics: Option<&[String]>) -> Result<String, EncodingError> {
        if self.is_empty {
            return Ok(String::new());
        }

        let statics: &[String] = match (&self.statics, cached_statics) {
            (Some(own), _) => own,
            (None, Some(cached)) => {
                if short_hash(cached) != self.skeleton_hash {
                    return Err(EncodingError::inconsistent(
                        Strategy::StaticDynamic,
                        format!("cached statics do not match skeleton {}", self.skeleton_hash),
                    ));
                }
                cached
            }
            (None, None) => {
                return Err(EncodingError::inconsistent(
                    Strategy::StaticDynamic,
                    "statics omitted and none cached",
                ))
            }
        };

        if statics.is_empty() {
            return Err(EncodingError::inconsistent(
                Strategy::StaticDynamic,
                "non-empty payload without statics",
            ));
        }

        let slots = statics.len() - 1;
        if let Some(position) = self
            .dynamics
            .keys()
            .chain(self.conditionals.keys())
            .find(|p| **p >= slots)
        {
            return Err(EncodingError::inconsistent(
                Strategy::StaticDynamic,
                format!("slot {position} outside skeleton with {slots} slots"),
            ));
        }

        let mut html = String::new();
        for (i, fixed) in statics.iter().enumerate() {
            html.push_str(fixed);
            if i == slots {
                break;
            }
            let value = self.dynamics.get(&i).ok_or_else(|| {
                EncodingError::inconsistent(Strategy::StaticDynamic, format!("slot {i} missing"))
            })?;
            match self.conditionals.get(&i) {
                Some(slot) => html.push_str(slot.select(value == "true")),
                None => html.push_str(value),
            }
        }
        Ok(html)
    }
}

#[derive(Serialize, Deserialize)]
struct StaticDynamicWire {
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    statics: Option<Vec<String>>,
    #[serde(rename = "h")]
    skeleton_hash: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    conditionals: BTreeMap<String, ConditionalSlot>,
    #[serde(rename = "isEmpty")]
    is_empty: bool,
    #[serde(flatten)]
    dynamics: BTreeMap<String, String>,
}

impl From<StaticDynamicData> for StaticDynamicWire {
    fn from(data: StaticDynamicData) -> Self {
        Self {
            statics: data.statics,
            skeleton_hash: data.skeleton_hash,
            conditionals: data
                .conditionals
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            is_empty: data.is_empty,
            dynamics: data
                .dynamics
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl TryFrom<StaticDynamicWire> for StaticDynamicData {
    type Error = String;

    fn try_from(wire: StaticDynamicWire) -> Result<Self, Self::Error> {
        fn keyed<V>(map: BTreeMap<String, V>) -> Result<BTreeMap<usize, V>, String> {
            map.into_iter()
                .map(|(k, v)| {
                    k.parse::<usize>()
                        .map(|k| (k, v))
                        .map_err(|_| format!("unexpected key {k:?}"))
                })
                .collect()
        }

        Ok(Self {
            statics: wire.statics,
            skeleton_hash: wire.skeleton_hash,
            dynamics: keyed(wire.dynamics)?,
            conditionals: keyed(wire.conditionals)?,
            is_empty: wire.is_empty,
        })
    }
}
