//! # livepatch configuration
//!
//! Operator-facing settings for the analyzer, the update generator, the tree
//! differ and the replacement heuristics, plus logging.
//!
//! Precedence is `defaults < file < environment`. Every section derives
//! `Default` and is `#[serde(default)]`, so a partial TOML file is valid.
//!
//! ```toml
//! [analyzer]
//! cache_ttl_secs = 60
//! cache_max_size = 500
//!
//! [generator]
//! preferred_strategy = 3
//! ```
//!
//! Analyzer and generator settings are applied to live objects through their
//! `set_config` methods, so none of them need a restart.

#![warn(missing_docs)]

mod components;
mod loader;

pub use components::*;
pub use loader::*;
