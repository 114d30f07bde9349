use anyhow::{anyhow, Result};
use livepatch_config::LivepatchConfig;
use livepatch_core::Strategy;
use livepatch_generator::UpdateGenerator;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use super::{read_json, read_template};

pub fn execute(
    config: &LivepatchConfig,
    template: &Path,
    old: &Path,
    new: &Path,
    strategy: Option<u8>,
    with_metrics: bool,
) -> Result<Value> {
    let template = read_template(template)?;
    let old_data = read_json(old)?;
    let new_data = read_json(new)?;

    let mut config = config.clone();
    if let Some(number) = strategy {
        let preferred = Strategy::from_number(number).ok_or_else(|| anyhow!("unknown strategy {number}"))?;
        config.generator.preferred_strategy = Some(preferred);
    }

    let generator = UpdateGenerator::from_config(&config);
    let fragments = generator.generate_update(&template, Some(&old_data), &new_data)?;
    info!(template = template.name(), fragments = fragments.len(), "update generated");

    if !with_metrics {
        return Ok(serde_json::to_value(&fragments)?);
    }
    Ok(json!({
        "fragments": fragments,
        "metrics": {
            "generator": generator.metrics(),
            "analyzer": generator.analyzer().metrics(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::write;
    use tempfile::TempDir;

    #[test]
    fn test_text_change() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "greeting.tmpl", "<div>{{.Message}}</div>");
        let old = write(&dir, "old.json", r#"{"Message": "Hello"}"#);
        let new = write(&dir, "new.json", r#"{"Message": "Hi there"}"#);

        let output = execute(&LivepatchConfig::default(), &template, &old, &new, None, false).unwrap();
        let fragments = output.as_array().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0]["strategyName"], "static_dynamic");
        assert_eq!(fragments[0]["data"]["0"], "Hi there");
    }

    #[test]
    fn test_preferred_strategy_and_metrics() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "greeting.tmpl", "<div>{{.Message}}</div>");
        let old = write(&dir, "old.json", r#"{"Message": "Hello"}"#);
        let new = write(&dir, "new.json", r#"{"Message": "Hi there"}"#);

        let output = execute(&LivepatchConfig::default(), &template, &old, &new, Some(4), true).unwrap();
        assert_eq!(output["fragments"][0]["strategyName"], "replacement");
        assert_eq!(output["metrics"]["generator"]["fallbackGenerations"], 1);
        assert_eq!(output["metrics"]["generator"]["totalGenerations"], 1);
    }

    #[test]
    fn test_render_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "t.tmpl", "<p>{{.Missing}}</p>");
        let data = write(&dir, "d.json", "{}");
        let err = execute(&LivepatchConfig::default(), &template, &data, &data, None, false).unwrap_err();
        assert!(err.to_string().contains("render failed"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "t.tmpl", "<p></p>");
        let missing = dir.path().join("nope.json");
        let err = execute(&LivepatchConfig::default(), &template, &missing, &missing, None, false).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
