use anyhow::Result;
use livepatch_config::LivepatchConfig;
use livepatch_generator::UpdateGenerator;
use livepatch_tree::TreeClient;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{read_json, read_template};

/// One tree update per data file, in order, as a client would receive them
pub fn execute(
    config: &LivepatchConfig,
    template: &Path,
    data: &[PathBuf],
    fragment: &str,
    with_html: bool,
) -> Result<Value> {
    let template = read_template(template)?;
    let generator = UpdateGenerator::from_config(config);
    let mut client = TreeClient::new(fragment);

    let mut updates = Vec::with_capacity(data.len());
    for path in data {
        let values = read_json(path)?;
        let tree = generator.generate_tree_update(fragment, &template, &values)?;
        debug!(file = %path.display(), empty = tree.is_empty(), "tree update");

        if with_html {
            let html = client.apply(&tree)?.to_string();
            updates.push(json!({ "tree": tree, "html": html }));
        } else {
            updates.push(serde_json::to_value(&tree)?);
        }
    }
    Ok(Value::Array(updates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::write;
    use tempfile::TempDir;

    #[test]
    fn test_sequence_of_updates() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "list.tmpl", "<ul>{{range .Items}}<li>{{.}}</li>{{end}}</ul>");
        let a = write(&dir, "a.json", r#"{"Items": ["x"]}"#);
        let b = write(&dir, "b.json", r#"{"Items": ["x", "y"]}"#);

        let output = execute(
            &LivepatchConfig::default(),
            &template,
            &[a.clone(), b, a.clone(), a],
            "list",
            true,
        )
        .unwrap();
        let updates = output.as_array().unwrap();
        assert_eq!(updates.len(), 4);
        assert!(updates[0]["tree"].get("s").is_some());
        assert!(updates[1]["tree"].get("s").is_none());
        assert_eq!(updates[1]["html"], "<ul><li>x</li><li>y</li></ul>");
        assert_eq!(updates[2]["html"], "<ul><li>x</li></ul>");
        assert_eq!(updates[3]["tree"], json!({}));
        assert_eq!(updates[3]["html"], "<ul><li>x</li></ul>");
    }
}
