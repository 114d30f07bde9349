use anyhow::Result;
use livepatch_config::LivepatchConfig;
use livepatch_strategy::StrategyAnalyzer;
use serde_json::Value;
use std::path::Path;

use super::read_text;

pub fn execute(config: &LivepatchConfig, old: &Path, new: &Path) -> Result<Value> {
    let old_html = read_text(old)?;
    let new_html = read_text(new)?;
    let analyzer = StrategyAnalyzer::with_rule_classifier(config.analyzer.clone());
    let analysis = analyzer.analyze(old_html.trim_end(), new_html.trim_end())?;
    Ok(serde_json::to_value(&analysis)?)
}
