//! Core types for adaptive HTML update encoding
//!
//! This crate holds everything the other livepatch crates agree on:
//!
//! - **Strategy vocabulary**: [`Strategy`], [`PatternType`] and [`ConditionalPattern`]
//! - **Analysis results**: [`Classification`] (what a classifier reports) and
//!   [`AnalysisResult`] (what the analyzer hands to encoders)
//! - **Wire objects**: [`Fragment`] and the four payload variants in [`payload`]
//! - **Error taxonomy**: classification, encoding and structural-mismatch errors
//! - **HTML helpers**: tag scanning, skeleton fingerprints and prefix/suffix diffing
//!
//! ## Architecture
//!
//! - This crate: pure data + reconstruction (`apply`) for every payload
//! - livepatch-classifier: decides the pattern for an (old, new) pair
//! - livepatch-strategy: caches analyses and compiles payloads
//! - livepatch-tree: nested skeleton/dynamics trees
//! - livepatch-generator: orchestration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livepatch_core::{Fragment, FragmentData};
//!
//! let html = fragment.reconstruct(previous_html, None)?;
//! ```

pub mod analysis;
pub mod error;
pub mod fragment;
pub mod hash;
pub mod html;
pub mod payload;
pub mod serde_util;
pub mod strategy;

pub use analysis::{AnalysisResult, Classification};
pub use error::{ClassificationError, EncodingError, HtmlSide, StructuralMismatchError};
pub use fragment::{Fragment, FragmentMetadata};
pub use hash::{fragment_id, short_hash, ContentHash};
pub use payload::{
    Complexity, ConditionalSlot, DomOperation, FragmentData, GranularOpData, MarkerPatchData,
    MarkerPosition, OperationType, ReplacementData, StaticDynamicData,
};
pub use strategy::{ConditionType, ConditionalPattern, PatternType, Strategy};
