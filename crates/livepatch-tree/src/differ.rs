//! Per-fragment skeleton cache and tree diffing
//!
//! ## State machine
//!
//! Each fragment id is `Uninitialized` until its first successful render,
//! which compiles the template into a [`Skeleton`] and sends every statics
//! array the render touches. From then on the fragment is `Cached`: renders
//! send dynamics only, plus the statics of any branch the client has never
//! seen. Two identical consecutive renders produce the empty tree.
//!
//! A template whose fingerprint differs from the cached one is a
//! [`StructuralMismatchError`]. [`TreeDiffer::try_diff`] surfaces it;
//! [`TreeDiffer::diff`] invalidates the fragment and answers with a first
//! render instead.
//!
//! ## Thread Safety
//!
//! The fragment map sits behind a `RwLock`; each fragment's state behind its
//! own `Mutex`. Calls for one fragment id serialize, different ids proceed in
//! parallel.

use livepatch_config::TreeConfig;
use livepatch_core::StructuralMismatchError;
use livepatch_template::Template;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::{TreeError, TreeResult};
use crate::node::Tree;
use crate::skeleton::Skeleton;

#[derive(Debug, Default)]
enum FragmentState {
    #[default]
    Uninitialized,
    Cached(CachedFragment),
}

#[derive(Debug)]
struct CachedFragment {
    skeleton: Arc<Skeleton>,
    /// Skeleton hashes whose statics the client holds
    sent: HashSet<String>,
    /// Dynamics of the last render
    last: Tree,
}

#[derive(Debug, Default)]
struct FragmentEntry {
    state: Mutex<FragmentState>,
    last_used: AtomicU64,
}

pub struct TreeDiffer {
    fragments: RwLock<HashMap<String, Arc<FragmentEntry>>>,
    config: RwLock<TreeConfig>,
    clock: AtomicU64,
}

impl Default for TreeDiffer {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeDiffer {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            fragments: RwLock::new(HashMap::new()),
            config: RwLock::new(config),
            clock: AtomicU64::new(0),
        }
    }

    pub fn set_config(&self, config: TreeConfig) {
        *self.config.write() = config;
    }

    /// Tree update for `fragment_id`, rebuilding the skeleton on a template change
    pub fn diff(&self, fragment_id: &str, template: &Template, data: &Value) -> TreeResult<Tree> {
        match self.try_diff(fragment_id, template, data) {
            Err(TreeError::StructuralMismatch(mismatch)) => {
                warn!(
                    fragment = fragment_id,
                    expected = %mismatch.expected,
                    found = %mismatch.found,
                    "template changed, rebuilding skeleton"
                );
                self.reset_fragment(fragment_id);
                self.try_diff(fragment_id, template, data)
            }
            other => other,
        }
    }

    /// Tree update for `fragment_id`; a template change is an error
    pub fn try_diff(&self, fragment_id: &str, template: &Template, data: &Value) -> TreeResult<Tree> {
        let entry = self.entry(fragment_id);
        let mut state = entry.state.lock();

        if let FragmentState::Cached(cached) = &mut *state {
            return next_render(cached, fragment_id, template, data);
        }

        let (tree, cached) = first_render(fragment_id, template, data)?;
        *state = FragmentState::Cached(cached);
        Ok(tree)
    }

    /// Forget one fragment; its next render is a first render
    pub fn reset_fragment(&self, fragment_id: &str) -> bool {
        self.fragments.write().remove(fragment_id).is_some()
    }

    /// Forget every fragment
    pub fn reset(&self) {
        self.fragments.write().clear();
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.read().len()
    }

    /// True once `fragment_id` has a cached skeleton
    ///
    /// Waits for a render of that fragment in progress, but not while holding
    /// the fragment map.
    pub fn is_cached(&self, fragment_id: &str) -> bool {
        let entry = self.fragments.read().get(fragment_id).cloned();
        entry.is_some_and(|entry| matches!(*entry.state.lock(), FragmentState::Cached(_)))
    }

    fn entry(&self, fragment_id: &str) -> Arc<FragmentEntry> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        if let Some(entry) = self.fragments.read().get(fragment_id) {
            entry.last_used.store(tick, Ordering::Relaxed);
            return Arc::clone(entry);
        }

        let max_fragments = self.config.read().max_fragments;
        let mut fragments = self.fragments.write();
        if !fragments.contains_key(fragment_id) {
            if let Some(max) = max_fragments {
                while fragments.len() >= max.max(1) {
                    let Some(oldest) = fragments
                        .iter()
                        .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                        .map(|(id, _)| id.clone())
                    else {
                        break;
                    };
                    debug!(fragment = %oldest, "evicted least recently used fragment");
                    fragments.remove(&oldest);
                }
            }
        }
        let entry = fragments.entry(fragment_id.to_string()).or_default();
        entry.last_used.store(tick, Ordering::Relaxed);
        Arc::clone(entry)
    }
}

fn first_render(fragment_id: &str, template: &Template, data: &Value) -> TreeResult<(Tree, CachedFragment)> {
    let skeleton = Arc::new(Skeleton::compile(template));
    let values = skeleton.evaluate(data)?;
    let mut sent = HashSet::new();
    let mut tree = values.clone();
    skeleton.attach_statics(&mut tree, &mut |hash: &str| sent.insert(hash.to_string()));
    debug!(
        fragment = fragment_id,
        skeleton = skeleton.root_hash(),
        blocks = skeleton.block_count(),
        "compiled skeleton"
    );
    Ok((
        tree,
        CachedFragment {
            skeleton,
            sent,
            last: values,
        },
    ))
}

fn next_render(
    cached: &mut CachedFragment,
    fragment_id: &str,
    template: &Template,
    data: &Value,
) -> TreeResult<Tree> {
    if cached.skeleton.fingerprint() != template.fingerprint() {
        return Err(StructuralMismatchError::new(
            fragment_id,
            cached.skeleton.fingerprint(),
            template.fingerprint(),
        )
        .into());
    }

    let values = cached.skeleton.evaluate(data)?;
    if values == cached.last {
        trace!(fragment = fragment_id, "render unchanged");
        return Ok(Tree::empty());
    }

    let mut tree = values.clone();
    let sent = &mut cached.sent;
    let mut rebuilt = 0usize;
    cached.skeleton.attach_statics(&mut tree, &mut |hash: &str| {
        let fresh = sent.insert(hash.to_string());
        rebuilt += usize::from(fresh);
        fresh
    });
    if rebuilt > 0 {
        debug!(fragment = fragment_id, rebuilt, "sent statics for unseen branches");
    }
    cached.last = values;
    Ok(tree)
}
