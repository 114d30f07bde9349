//! Update generation
//!
//! ## Purpose
//!
//! The entry point a server calls per state change: render a template for the
//! old and new data, pick an encoding and return fragments the client can
//! apply, or a tree update for whole-template mode.
//!
//! ## Architecture
//!
//! - [`UpdateGenerator`]: render → analyze → encode → fall back
//! - [`GenerationMetrics`]: success/failure/fallback counters and timing
//! - [`GenerationError`]: render, classification, encoding and skeleton failures
//!
//! Fragment mode and tree mode are separate calls; a response carries one
//! kind or the other, never both.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livepatch_config::LivepatchConfig;
//! use livepatch_generator::UpdateGenerator;
//! use livepatch_template::Template;
//! use serde_json::json;
//!
//! let generator = UpdateGenerator::from_config(&LivepatchConfig::default());
//! let template = Template::parse("greeting", "<div>{{.Message}}</div>")?;
//!
//! let fragments = generator.generate_update(
//!     &template,
//!     Some(&json!({"Message": "Hello"})),
//!     &json!({"Message": "Hi there"}),
//! )?;
//! ```

pub mod error;
pub mod generator;
pub mod metrics;

pub use error::{GenerationError, GenerationResult};
pub use generator::UpdateGenerator;
pub use metrics::GenerationMetrics;
