pub mod classify;
pub mod config;
pub mod diff;
pub mod tree;

use anyhow::{Context, Result};
use livepatch_template::Template;
use serde_json::Value;
use std::path::Path;

/// Parse a template file, naming it after the file stem
pub(crate) fn read_template(path: &Path) -> Result<Template> {
    let source = read_text(path)?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("template");
    Template::parse(name, source).with_context(|| format!("failed to parse template {}", path.display()))
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
