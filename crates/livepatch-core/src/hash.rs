//! Content hashing for cache keys, fragment ids and skeleton fingerprints
//!
//! All hashes are BLAKE3 truncated to 16 bytes. Collision resistance of 128
//! bits is plenty for keying renderings of a single page.

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-byte content hash
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    pub const SIZE: usize = 16;

    /// Hash a single byte string
    #[inline]
    pub fn from_content(content: &[u8]) -> Self {
        Self::from_parts(&[content])
    }

    /// Hash a sequence of byte strings
    ///
    /// Each part is length-prefixed, so no two different sequences share an
    /// encoding whatever bytes the parts contain.
    pub fn from_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(&(parts.len() as u64).to_le_bytes());
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        Self(bytes)
    }

    /// Cache key for an (old, new) rendering pair
    pub fn transition(old_html: &str, new_html: &str) -> Self {
        Self::from_parts(&[old_html.as_bytes(), new_html.as_bytes()])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 bytes as 16 hex characters
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 16-hex-char hash over a list of strings, used for skeleton fingerprints
///
/// Parts are length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn short_hash<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&(parts.len() as u64).to_le_bytes());
    for part in parts {
        let part = part.as_ref();
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(&hasher.finalize().as_bytes()[..8])
}

/// Deterministic fragment id for a transition
///
/// Derived from the hash of (strategy name, old HTML, new HTML) so identical transitions
/// yield identical ids and retransmission is idempotent.
pub fn fragment_id(strategy_name: &str, old_html: &str, new_html: &str) -> String {
    let hash = ContentHash::from_parts(&[
        strategy_name.as_bytes(),
        old_html.as_bytes(),
        new_html.as_bytes(),
    ]);
    format!("frag_{}", hash.short_hex())
}
