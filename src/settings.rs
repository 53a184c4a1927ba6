//! Persisting the activation plan into project settings.
//!
//! The settings document is JSON. The activation map lives under one
//! well-known key and is always replaced wholesale with the newly computed
//! plan; every sibling key is carried over untouched. An unparseable
//! existing document is a fatal error, never silently overwritten.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{DevforgeError, Result};
use crate::plugins::ActivationPlan;

/// Top-level settings key holding the identifier -> enabled map.
pub const ACTIVATION_KEY: &str = "enabledPlugins";

/// Compute the merged settings document.
///
/// `existing` is the current file content, if any; `path` is used only for
/// error reporting. The activation key always ends up exactly equal to the
/// plan — entries from a previous run that the new plan omits are dropped.
pub fn merged_document(
    existing: Option<&str>,
    path: &Path,
    plan: &ActivationPlan,
) -> Result<String> {
    let mut root = match existing {
        Some(content) => {
            let value: Value = serde_json::from_str(content).map_err(|e| {
                DevforgeError::SettingsParse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            match value {
                Value::Object(map) => map,
                other => {
                    return Err(DevforgeError::SettingsParse {
                        path: path.to_path_buf(),
                        reason: format!("expected a JSON object, found {}", json_type(&other)),
                    })
                }
            }
        }
        None => Map::new(),
    };

    let activation: Map<String, Value> = plan
        .entries
        .iter()
        .map(|(id, enabled)| (id.clone(), Value::Bool(*enabled)))
        .collect();
    root.insert(ACTIVATION_KEY.to_string(), Value::Object(activation));

    let mut out = serde_json::to_string_pretty(&Value::Object(root))?;
    out.push('\n');
    Ok(out)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn plan(entries: &[(&str, bool)]) -> ActivationPlan {
        ActivationPlan {
            entries: entries
                .iter()
                .map(|(id, enabled)| (id.to_string(), *enabled))
                .collect::<BTreeMap<_, _>>(),
            warnings: vec![],
        }
    }

    fn settings_path() -> PathBuf {
        PathBuf::from(".claude/settings.json")
    }

    #[test]
    fn test_creates_document_with_only_activation_map() {
        let plan = plan(&[("a@m1", true), ("b@m2", false)]);
        let doc = merged_document(None, &settings_path(), &plan).unwrap();

        let value: Value = serde_json::from_str(&doc).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        let plugins = obj[ACTIVATION_KEY].as_object().unwrap();
        assert_eq!(plugins["a@m1"], Value::Bool(true));
        assert_eq!(plugins["b@m2"], Value::Bool(false));
    }

    #[test]
    fn test_preserves_unrelated_keys() {
        let existing = r#"{
  "permissions": {"allow": ["Bash(ls:*)"]},
  "model": "sonnet",
  "enabledPlugins": {"old@m": true}
}"#;
        let plan = plan(&[("new@m", true)]);
        let doc = merged_document(Some(existing), &settings_path(), &plan).unwrap();

        let value: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(value["model"], Value::String("sonnet".to_string()));
        assert_eq!(value["permissions"]["allow"][0], "Bash(ls:*)");
    }

    #[test]
    fn test_activation_key_is_replaced_wholesale() {
        let existing = r#"{"enabledPlugins": {"stale@m": true, "kept@m": false}}"#;
        let plan = plan(&[("kept@m", true)]);
        let doc = merged_document(Some(existing), &settings_path(), &plan).unwrap();

        let value: Value = serde_json::from_str(&doc).unwrap();
        let plugins = value[ACTIVATION_KEY].as_object().unwrap();
        assert_eq!(plugins.len(), 1);
        assert!(!plugins.contains_key("stale@m"));
        assert_eq!(plugins["kept@m"], Value::Bool(true));
    }

    #[test]
    fn test_unparseable_document_is_fatal() {
        let err =
            merged_document(Some("{ not json"), &settings_path(), &plan(&[])).unwrap_err();
        assert!(matches!(err, DevforgeError::SettingsParse { .. }));
    }

    #[test]
    fn test_non_object_document_is_fatal() {
        let err =
            merged_document(Some("[1, 2, 3]"), &settings_path(), &plan(&[])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("an array"));
    }

    #[test]
    fn test_empty_plan_clears_activation_map() {
        let existing = r#"{"enabledPlugins": {"stale@m": true}, "model": "opus"}"#;
        let doc = merged_document(Some(existing), &settings_path(), &plan(&[])).unwrap();

        let value: Value = serde_json::from_str(&doc).unwrap();
        assert!(value[ACTIVATION_KEY].as_object().unwrap().is_empty());
        assert_eq!(value["model"], "opus");
    }

    #[test]
    fn test_merge_is_deterministic() {
        let existing = r#"{"model": "sonnet"}"#;
        let plan = plan(&[("b@m", false), ("a@m", true)]);
        let first = merged_document(Some(existing), &settings_path(), &plan).unwrap();
        let second = merged_document(Some(existing), &settings_path(), &plan).unwrap();
        assert_eq!(first, second);
    }
}
