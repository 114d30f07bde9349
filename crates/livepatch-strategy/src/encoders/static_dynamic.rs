use livepatch_core::html::{common_affixes, skeleton_fingerprint};
use livepatch_core::{
    ConditionType, ConditionalSlot, EncodingError, FragmentData, StaticDynamicData, Strategy,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

use super::{EncodeContext, FragmentEncoder};

/// Strategy 1: statics plus one dynamic slot
///
/// With static caching on, the encoder remembers which skeleton hashes each
/// fragment key has already been sent and omits `s` for those.
#[derive(Debug, Default)]
pub struct StaticDynamicEncoder {
    cache_statics: AtomicBool,
    sent: RwLock<HashMap<String, HashSet<String>>>,
}

impl StaticDynamicEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cache_statics(&self, enabled: bool) {
        self.cache_statics.store(enabled, Ordering::Relaxed);
    }

    pub fn cache_statics(&self) -> bool {
        self.cache_statics.load(Ordering::Relaxed)
    }

    /// Forget what was sent for one fragment key
    pub fn forget(&self, fragment_key: &str) {
        self.sent.write().remove(fragment_key);
    }

    /// Forget everything that was sent
    pub fn reset(&self) {
        self.sent.write().clear();
    }

    fn build(&self, ctx: &EncodeContext<'_>) -> Result<StaticDynamicData, EncodingError> {
        let (old, new) = (ctx.old_html, ctx.new_html);

        if new.is_empty() {
            return Ok(StaticDynamicData::empty());
        }
        if old.is_empty() {
            return Ok(whole_content(new));
        }

        if let Some(conditional) = &ctx.analysis.conditional {
            if conditional.current_value() != new {
                return Err(EncodingError::inconsistent(
                    Strategy::StaticDynamic,
                    "conditional branch does not match the new rendering",
                ));
            }
            let slot = ConditionalSlot {
                condition_type: conditional.condition_type,
                truthy_value: conditional.truthy_value.clone(),
                falsy_value: conditional.falsy_value.clone(),
                is_full_element: matches!(
                    conditional.condition_type,
                    ConditionType::ShowHide | ConditionType::IfElse
                ),
            };
            return Ok(StaticDynamicData::conditional(
                String::new(),
                String::new(),
                slot,
                conditional.new_is_truthy,
            ));
        }

        if skeleton_fingerprint(old) != skeleton_fingerprint(new) {
            trace!("tag skeleton changed, using a whole-content slot");
            return Ok(whole_content(new));
        }

        let affixes = common_affixes(old, new).snap_to_boundaries(new);
        let statics = vec![
            new[..affixes.prefix].to_string(),
            new[new.len() - affixes.suffix..].to_string(),
        ];
        let dynamics = BTreeMap::from([(0, affixes.middle(new).to_string())]);
        Ok(StaticDynamicData::new(statics, dynamics))
    }

    /// Drop statics the client already holds for this fragment key
    fn dedupe_statics(&self, data: StaticDynamicData, fragment_key: Option<&str>) -> StaticDynamicData {
        let Some(key) = fragment_key else {
            return data;
        };
        if !self.cache_statics() || data.is_empty {
            return data;
        }
        let mut sent = self.sent.write();
        let hashes = sent.entry(key.to_string()).or_default();
        if hashes.contains(&data.skeleton_hash) {
            trace!(fragment = key, skeleton = %data.skeleton_hash, "statics already sent");
            data.without_statics()
        } else {
            hashes.insert(data.skeleton_hash.clone());
            data
        }
    }
}

fn whole_content(html: &str) -> StaticDynamicData {
    StaticDynamicData::new(
        vec![String::new(), String::new()],
        BTreeMap::from([(0, html.to_string())]),
    )
}

impl FragmentEncoder for StaticDynamicEncoder {
    fn strategy(&self) -> Strategy {
        Strategy::StaticDynamic
    }

    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<FragmentData, EncodingError> {
        let data = self.build(ctx)?;
        Ok(self.dedupe_statics(data, ctx.fragment_key).into())
    }
}
