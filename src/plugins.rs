//! Plugin activation resolution.
//!
//! The registry of installed plugins is read-only input: a set of
//! fully-qualified identifiers (`name@marketplace`) with install metadata.
//! Resolution reconciles user activation intent against that registry and
//! produces a fresh activation plan on every run.
//!
//! Name lookup is two-tier over a deterministically ordered registry
//! (lexicographic by identifier): an exact match on `name@` wins; otherwise
//! the first identifier containing the name as a substring is taken; a name
//! matching nothing is dropped with a warning and resolution continues.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Where an installed plugin lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginScope {
    User,
    Project,
}

/// One installed plugin, keyed by its fully-qualified identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Fully-qualified identifier, `name@marketplace`.
    pub id: String,

    pub scope: PluginScope,

    pub install_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    plugins: Vec<RegistryEntry>,
}

/// The set of installed plugins. Never mutated by this pipeline.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl PluginRegistry {
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    /// Load the registry document from disk. An absent file is an empty
    /// registry, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let document: RegistryDocument = serde_json::from_str(&content)?;
        Ok(Self::from_entries(document.plugins))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Two-tier lookup: exact `name@` prefix (or the full identifier), then
    /// first substring match in iteration order.
    fn resolve_name(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}@", name);
        if let Some(id) = self
            .ids()
            .find(|id| *id == name || id.starts_with(&prefix))
        {
            return Some(id);
        }
        self.ids().find(|id| id.contains(name))
    }
}

/// The computed enable/disable map. Built fresh on every resolution run;
/// never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationPlan {
    pub entries: BTreeMap<String, bool>,
    pub warnings: Vec<String>,
}

impl ActivationPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve activation and deactivation name lists against the registry.
///
/// Activations are processed first; a deactivation never overrides an
/// identifier the activation pass already enabled.
pub fn resolve_activation(
    registry: &PluginRegistry,
    activate: &[String],
    deactivate: &[String],
) -> ActivationPlan {
    let mut plan = ActivationPlan::default();

    for name in activate {
        match registry.resolve_name(name) {
            Some(id) => {
                plan.entries.insert(id.to_string(), true);
            }
            None => plan.warnings.push(format!(
                "Plugin '{}' not found in registry; skipping activation",
                name
            )),
        }
    }

    for name in deactivate {
        match registry.resolve_name(name) {
            Some(id) => {
                if plan.entries.get(id) != Some(&true) {
                    plan.entries.insert(id.to_string(), false);
                }
            }
            None => plan.warnings.push(format!(
                "Plugin '{}' not found in registry; skipping deactivation",
                name
            )),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> RegistryEntry {
        RegistryEntry {
            id: id.to_string(),
            scope: PluginScope::Project,
            install_path: PathBuf::from(format!("/plugins/{}", id)),
        }
    }

    fn registry(ids: &[&str]) -> PluginRegistry {
        PluginRegistry::from_entries(ids.iter().map(|id| entry(id)))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_activate_and_deactivate_distinct_plugins() {
        let registry = registry(&["a@m1", "b@m2"]);
        let plan = resolve_activation(&registry, &names(&["a"]), &names(&["b"]));
        assert_eq!(plan.entries.get("a@m1"), Some(&true));
        assert_eq!(plan.entries.get("b@m2"), Some(&false));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_activation_takes_precedence_over_deactivation() {
        let registry = registry(&["a@m1"]);
        let plan = resolve_activation(&registry, &names(&["a"]), &names(&["a"]));
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries.get("a@m1"), Some(&true));
    }

    #[test]
    fn test_unmatched_name_warns_and_continues() {
        let registry = registry(&["a@m1"]);
        let plan = resolve_activation(&registry, &names(&["ghost", "a"]), &[]);
        assert_eq!(plan.entries.get("a@m1"), Some(&true));
        assert!(!plan.entries.contains_key("ghost"));
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("ghost"));
    }

    #[test]
    fn test_exact_match_beats_substring() {
        // "tool" is a substring of both ids, but "tool@m1" is an exact
        // prefix match and must win regardless of order.
        let registry = registry(&["supertool@m0", "tool@m1"]);
        let plan = resolve_activation(&registry, &names(&["tool"]), &[]);
        assert_eq!(plan.entries.get("tool@m1"), Some(&true));
        assert!(!plan.entries.contains_key("supertool@m0"));
    }

    #[test]
    fn test_substring_fallback_takes_first_in_lexicographic_order() {
        let registry = registry(&["beta-helper@m2", "alpha-helper@m1"]);
        let plan = resolve_activation(&registry, &names(&["helper"]), &[]);
        assert_eq!(plan.entries.get("alpha-helper@m1"), Some(&true));
        assert_eq!(plan.entries.len(), 1);
    }

    #[test]
    fn test_fully_qualified_name_resolves() {
        let registry = registry(&["a@m1", "a@m2"]);
        let plan = resolve_activation(&registry, &names(&["a@m2"]), &[]);
        assert_eq!(plan.entries.get("a@m2"), Some(&true));
        assert_eq!(plan.entries.len(), 1);
    }

    #[test]
    fn test_plan_is_fresh_each_run() {
        let registry = registry(&["a@m1", "b@m1"]);
        let first = resolve_activation(&registry, &names(&["a", "b"]), &[]);
        assert_eq!(first.entries.len(), 2);

        let second = resolve_activation(&registry, &names(&["a"]), &[]);
        assert_eq!(second.entries.len(), 1);
        assert!(!second.entries.contains_key("b@m1"));
    }

    #[test]
    fn test_empty_registry_drops_everything_with_warnings() {
        let registry = PluginRegistry::default();
        let plan = resolve_activation(&registry, &names(&["a"]), &names(&["b"]));
        assert!(plan.is_empty());
        assert_eq!(plan.warnings.len(), 2);
    }

    #[test]
    fn test_registry_load_missing_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let registry = PluginRegistry::load(&temp.path().join("registry.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_load_document() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("registry.json");
        std::fs::write(
            &path,
            r#"{
  "plugins": [
    {"id": "oh-my-claudecode@omc", "scope": "project", "installPath": "/plugins/omc"},
    {"id": "helper@omc", "scope": "user", "installPath": "/plugins/helper"}
  ]
}"#,
        )
        .unwrap();

        let registry = PluginRegistry::load(&path).unwrap();
        assert_eq!(registry.ids().count(), 2);
        let entry = registry.get("helper@omc").unwrap();
        assert_eq!(entry.scope, PluginScope::User);
    }

    #[test]
    fn test_registry_load_malformed_document_fails() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("registry.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(PluginRegistry::load(&path).is_err());
    }

    #[test]
    fn test_ids_are_lexicographic() {
        let registry = registry(&["z@m", "a@m", "m@m"]);
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["a@m", "m@m", "z@m"]);
    }
}
