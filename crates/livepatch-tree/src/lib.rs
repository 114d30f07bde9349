//! Nested skeleton/dynamics trees
//!
//! ## Purpose
//!
//! Alternative to per-change fragments for whole templates: the static text
//! of a template is sent once per fragment id and every later update carries
//! only the values that go between the statics.
//!
//! ## Architecture
//!
//! - [`Skeleton`]: a template compiled into blocks of statics and slots
//! - [`TreeDiffer`]: per-fragment skeleton cache, emits [`Tree`] updates
//! - [`TreeClient`]: reconstructs HTML from updates the way a browser would
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livepatch_tree::{TreeClient, TreeDiffer};
//!
//! let differ = TreeDiffer::default();
//! let mut client = TreeClient::new("counter");
//!
//! let update = differ.diff("counter", &template, &data)?;
//! assert_eq!(client.apply(&update)?, template.render(&data)?);
//! ```

pub mod client;
pub mod differ;
pub mod error;
pub mod node;
pub mod skeleton;

pub use client::TreeClient;
pub use differ::TreeDiffer;
pub use error::{TreeError, TreeResult};
pub use node::{Tree, TreeNode};
pub use skeleton::Skeleton;
