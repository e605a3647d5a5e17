//! Scenarios loaded from JSON files.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use super::TestScenario;

/// A script file holds either one scenario or a list of them.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or holds no scenarios.
pub fn load(path: &Path) -> Result<Vec<TestScenario>> {
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let scenarios = parse(&json).with_context(|| format!("invalid script {}", path.display()))?;
    if scenarios.is_empty() {
        bail!("script {} contains no scenarios", path.display());
    }
    Ok(scenarios)
}

pub fn parse(json: &str) -> Result<Vec<TestScenario>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::scenario::{Expectation, Step};
    use unencountered_engine::EventKind;

    #[test]
    fn single_scenario_script_parses() {
        let scenarios = parse(
            r#"{
                "name": "peek",
                "steps": [
                    {"step": "keys", "keys": ["Enter"]},
                    {"step": "tick", "ms": 16},
                    {"step": "check", "expect": {"kind": "scene", "scene": "lobby"}}
                ],
                "expectations": [
                    {"kind": "events", "event": "item_acquired", "count": 0}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scenarios.len(), 1);
        let scenario = &scenarios[0];
        assert_eq!(scenario.steps[1], Step::Tick { ms: 16.0 });
        assert_eq!(
            scenario.steps[2],
            Step::Check {
                expect: Expectation::scene("lobby")
            }
        );
        assert_eq!(
            scenario.expectations,
            vec![Expectation::Events {
                event: EventKind::ItemAcquired,
                count: 0
            }]
        );
    }

    #[test]
    fn lists_and_errors() {
        let scenarios = parse(r#"[{"name": "a", "steps": []}, {"name": "b", "steps": []}]"#).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert!(parse(r#"{"name": "a", "steps": [{"step": "jump"}]}"#).is_err());
        assert!(load(Path::new("/no/such/script.json")).is_err());
    }
}
