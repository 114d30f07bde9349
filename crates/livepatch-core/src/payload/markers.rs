use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EncodingError;
use crate::strategy::Strategy;

/// Byte range in the previous HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

impl MarkerPosition {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            length: end.saturating_sub(start),
        }
    }
}

/// Strategy 2 payload: byte ranges into the previous HTML plus replacements
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPatchData {
    pub position_map: BTreeMap<usize, MarkerPosition>,
    pub value_updates: BTreeMap<usize, String>,
    pub is_empty: bool,
}

impl MarkerPatchData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            is_empty: true,
            ..Self::default()
        }
    }

    /// Record a patch and return its marker index
    pub fn push(&mut self, start: usize, end: usize, value: impl Into<String>) -> usize {
        let index = self.position_map.len();
        self.position_map.insert(index, MarkerPosition::new(start, end));
        self.value_updates.insert(index, value.into());
        index
    }

    pub fn patch_count(&self) -> usize {
        self.position_map.len()
    }

    /// Apply every patch to `previous`, highest start offset first
    pub fn apply(&self, previous: &str) -> Result<String, EncodingError> {
        if self.is_empty {
            return Ok(String::new());
        }

        let mut patches = Vec::with_capacity(self.position_map.len());
        for (index, position) in &self.position_map {
            let value = self.value_updates.get(index).ok_or_else(|| {
                EncodingError::inconsistent(Strategy::Markers, format!("marker {index} has no value"))
            })?;
            if position.start > position.end
                || position.end > previous.len()
                || position.length != position.end - position.start
                || !previous.is_char_boundary(position.start)
                || !previous.is_char_boundary(position.end)
            {
                return Err(EncodingError::inconsistent(
                    Strategy::Markers,
                    format!(
                        "marker {index} range {}..{} invalid for {} bytes",
                        position.start,
                        position.end,
                        previous.len()
                    ),
                ));
            }
            patches.push((*index, *position, value.as_str()));
        }

        // descending start keeps earlier offsets valid while patching; on a
        // shared start the later marker goes first so insertions stay in order
        patches.sort_by(|a, b| b.1.start.cmp(&a.1.start).then(b.0.cmp(&a.0)));

        let mut html = previous.to_string();
        let mut floor = usize::MAX;
        for (_, position, value) in patches {
            if position.end > floor {
                return Err(EncodingError::inconsistent(
                    Strategy::Markers,
                    format!("overlapping markers at {}..{}", position.start, position.end),
                ));
            }
            html.replace_range(position.start..position.end, value);
            floor = position.start;
        }
        Ok(html)
    }
}
