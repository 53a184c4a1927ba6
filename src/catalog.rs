//! Built-in template and preset catalog.
//!
//! Descriptors and template text are embedded at compile time and parsed into
//! a registry on first use. To add a template or preset: add one entry to the
//! embedded file list and create the asset directory.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{DevforgeError, Result};

/// Template identity and constraints, from `template.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,

    /// Runtime language this template provisions, if any.
    #[serde(default)]
    pub language: Option<String>,

    /// Default image when the document does not pick one.
    pub image: String,

    /// Default package manager for the template's language.
    #[serde(default)]
    pub package_manager: Option<String>,

    #[serde(default)]
    pub lang_version_default: Option<String>,

    #[serde(default)]
    pub supported_versions: Vec<String>,

    #[serde(default)]
    pub features: Vec<FeatureRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRef {
    pub name: String,
    pub description: String,
}

impl TemplateDescriptor {
    pub fn supports_version(&self, version: &str) -> bool {
        self.supported_versions.is_empty()
            || self.supported_versions.iter().any(|v| v == version)
    }

    /// Check a requested language version against the supported set.
    pub fn require_version(&self, version: &str) -> Result<()> {
        if self.supports_version(version) {
            return Ok(());
        }
        Err(DevforgeError::UnsupportedVersion {
            template: self.name.clone(),
            requested: version.to_string(),
            supported: self.supported_versions.join(", "),
        })
    }
}

/// A template descriptor together with its renderable assets.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub info: TemplateDescriptor,
    pub devcontainer: String,
    pub dockerfile: String,
}

/// A named bundle of template defaults. Preset values sit beneath explicit
/// caller values during resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct PresetDescriptor {
    pub name: String,
    pub template: String,

    #[serde(default)]
    pub lang_version: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    /// Qualified plugin names (`name@marketplace`) to activate.
    #[serde(default)]
    pub activate_plugins: Vec<String>,

    #[serde(default)]
    pub deactivate_plugins: Vec<String>,

    /// Marketplace name to URL.
    #[serde(default)]
    pub marketplaces: BTreeMap<String, String>,
}

impl PresetDescriptor {
    /// Qualified names with their default activation flag, activations first.
    pub fn plugin_defaults(&self) -> Vec<(String, bool)> {
        let mut defaults: Vec<(String, bool)> = self
            .activate_plugins
            .iter()
            .map(|name| (name.clone(), true))
            .collect();
        defaults.extend(
            self.deactivate_plugins
                .iter()
                .map(|name| (name.clone(), false)),
        );
        defaults
    }
}

pub struct Catalog {
    templates: BTreeMap<String, TemplateEntry>,
    presets: BTreeMap<String, PresetDescriptor>,
}

impl Catalog {
    /// Load all embedded template and preset definitions.
    pub fn load() -> Result<Self> {
        const TEMPLATE_FILES: &[(&str, &str, &str, &str)] = &[
            (
                "generic",
                include_str!("../templates/generic/template.toml"),
                include_str!("../templates/generic/devcontainer.json.tmpl"),
                include_str!("../templates/generic/Dockerfile.tmpl"),
            ),
            (
                "python",
                include_str!("../templates/python/template.toml"),
                include_str!("../templates/python/devcontainer.json.tmpl"),
                include_str!("../templates/python/Dockerfile.tmpl"),
            ),
            (
                "node",
                include_str!("../templates/node/template.toml"),
                include_str!("../templates/node/devcontainer.json.tmpl"),
                include_str!("../templates/node/Dockerfile.tmpl"),
            ),
        ];

        const PRESET_FILES: &[(&str, &str)] = &[
            ("python-uv", include_str!("../presets/python-uv.toml")),
            ("node-pnpm", include_str!("../presets/node-pnpm.toml")),
        ];

        let mut templates = BTreeMap::new();
        for (name, info_toml, devcontainer, dockerfile) in TEMPLATE_FILES {
            let info: TemplateDescriptor = toml::from_str(info_toml).map_err(|e| {
                DevforgeError::InvalidConfig(format!(
                    "Failed to parse template descriptor '{}': {}",
                    name, e
                ))
            })?;
            templates.insert(
                name.to_string(),
                TemplateEntry {
                    info,
                    devcontainer: devcontainer.to_string(),
                    dockerfile: dockerfile.to_string(),
                },
            );
        }

        let mut presets = BTreeMap::new();
        for (name, preset_toml) in PRESET_FILES {
            let preset: PresetDescriptor = toml::from_str(preset_toml).map_err(|e| {
                DevforgeError::InvalidConfig(format!(
                    "Failed to parse preset '{}': {}",
                    name, e
                ))
            })?;
            presets.insert(name.to_string(), preset);
        }

        Ok(Self { templates, presets })
    }

    pub fn template(&self, name: &str) -> Result<&TemplateEntry> {
        self.templates
            .get(name)
            .ok_or_else(|| DevforgeError::TemplateNotFound(name.to_string()))
    }

    pub fn preset(&self, name: &str) -> Result<&PresetDescriptor> {
        self.presets
            .get(name)
            .ok_or_else(|| DevforgeError::PresetNotFound(name.to_string()))
    }

    /// Templates in name order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.templates.values()
    }

    /// Presets in name order.
    pub fn presets(&self) -> impl Iterator<Item = &PresetDescriptor> {
        self.presets.values()
    }
}
