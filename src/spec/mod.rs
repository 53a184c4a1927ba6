//! Specification resolution.
//!
//! Turns a raw `devforge.toml` document, an optional preset, and explicit
//! caller overrides into an immutable [`ProjectSpec`]. Resolution order is
//! preset defaults, then document values, then explicit overrides (explicit
//! wins). The schema version is checked before any other field is read, and
//! semantic validation collects every violation instead of stopping at the
//! first.

pub mod v0_1;
pub mod version;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::PresetDescriptor;
use crate::error::{DevforgeError, FieldViolation, Result};
pub use v0_1::{GeneratedFilesPolicy, SpecDocument};
pub use version::SchemaVersion;

/// Claude API providers this pipeline can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    Openai,
    Bedrock,
    Vertex,
    Azure,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[
        Provider::Anthropic,
        Provider::Openai,
        Provider::Bedrock,
        Provider::Vertex,
        Provider::Azure,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anthropic" => Some(Provider::Anthropic),
            "openai" => Some(Provider::Openai),
            "bedrock" => Some(Provider::Bedrock),
            "vertex" => Some(Provider::Vertex),
            "azure" => Some(Provider::Azure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Openai => "openai",
            Provider::Bedrock => "bedrock",
            Provider::Vertex => "vertex",
            Provider::Azure => "azure",
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime language settings carried into template rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSpec {
    pub language: String,
    pub version: String,
    pub package_manager: String,
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySpec {
    pub http: Option<String>,
    pub https: Option<String>,
    pub no_proxy: Option<String>,
}

/// One plugin declaration from the document or a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDecl {
    pub marketplace: String,
    pub name: String,
    pub activate: bool,
}

impl PluginDecl {
    /// Fully-qualified identifier, `name@marketplace`.
    pub fn qualified_name(&self) -> String {
        format!("{}@{}", self.name, self.marketplace)
    }
}

/// A resolved, fully-defaulted project specification.
///
/// Owned by a single generator invocation; nothing holds onto it after the
/// run completes.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub schema_version: SchemaVersion,
    pub name: String,
    pub template: String,
    pub workspace_dir: String,
    pub image: String,
    pub build_args: Vec<String>,
    pub claude_version: String,
    pub provider: Provider,
    pub models: BTreeMap<String, String>,
    pub runtime: Option<RuntimeSpec>,
    pub proxy: Option<ProxySpec>,
    pub marketplaces: BTreeMap<String, String>,
    pub plugins: Vec<PluginDecl>,
    pub generated_files: GeneratedFilesPolicy,
}

/// Explicit caller-supplied values. These beat both the document and any
/// preset for the fields they set.
#[derive(Debug, Clone, Default)]
pub struct SpecOverrides {
    pub lang_version: Option<String>,
    pub claude_version: Option<String>,
    pub provider: Option<String>,
    pub proxy_http: Option<String>,
    pub proxy_https: Option<String>,
    pub no_proxy: Option<String>,
}

impl SpecOverrides {
    fn has_proxy(&self) -> bool {
        self.proxy_http.is_some() || self.proxy_https.is_some() || self.no_proxy.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: Option<String>,
}

/// Resolve a raw document into a [`ProjectSpec`].
///
/// The schema version is dispatched first; an unrecognized version fails
/// before any other field is examined. All semantic violations are collected
/// into one aggregate error.
pub fn resolve(
    text: &str,
    preset: Option<&PresetDescriptor>,
    overrides: &SpecOverrides,
) -> Result<ProjectSpec> {
    let probe: VersionProbe = toml::from_str(text)?;
    let version_tag = probe.version.ok_or_else(|| {
        DevforgeError::UnsupportedSchemaVersion {
            found: "(missing)".to_string(),
            supported: version::SUPPORTED_VERSIONS.to_string(),
        }
    })?;
    let schema_version = SchemaVersion::parse(&version_tag)?;

    match schema_version {
        SchemaVersion::V0_1 => resolve_v0_1(text, preset, overrides),
    }
}

fn resolve_v0_1(
    text: &str,
    preset: Option<&PresetDescriptor>,
    overrides: &SpecOverrides,
) -> Result<ProjectSpec> {
    let doc = SpecDocument::parse(text)?;
    let mut violations = Vec::new();

    // Preset values act as defaults beneath the document.
    let mut marketplaces: BTreeMap<String, String> = doc
        .marketplaces
        .iter()
        .map(|(name, m)| (name.clone(), m.url.clone()))
        .collect();
    let mut plugins: Vec<PluginDecl> = doc
        .plugins
        .iter()
        .map(|p| PluginDecl {
            marketplace: p.marketplace.clone(),
            name: p.name.clone(),
            activate: p.activate,
        })
        .collect();

    if let Some(preset) = preset {
        for (name, url) in &preset.marketplaces {
            marketplaces
                .entry(name.clone())
                .or_insert_with(|| url.clone());
        }
        for (qualified, activate) in preset.plugin_defaults() {
            match split_qualified(&qualified, &preset.marketplaces) {
                Some((name, marketplace)) => {
                    let already_declared = plugins.iter().any(|p| p.name == name);
                    if !already_declared {
                        plugins.push(PluginDecl {
                            marketplace,
                            name,
                            activate,
                        });
                    }
                }
                None => violations.push(FieldViolation::new(
                    "preset.plugins",
                    format!("plugin '{}' must be qualified as name@marketplace", qualified),
                )),
            }
        }
    }

    let mut runtime = doc.runtime.as_ref().map(|r| RuntimeSpec {
        language: r.language.clone(),
        version: r.version.clone(),
        package_manager: r.package_manager.clone(),
        tools: r.tools.clone(),
    });
    if let Some(ref mut rt) = runtime {
        if rt.version.is_empty() {
            if let Some(preset_version) = preset.and_then(|p| p.lang_version.clone()) {
                rt.version = preset_version;
            }
        }
        // Explicit override wins over both document and preset.
        if let Some(ref v) = overrides.lang_version {
            rt.version = v.clone();
        }
    }

    let claude_version = overrides
        .claude_version
        .clone()
        .unwrap_or_else(|| doc.claude.version.clone());
    let provider_name = overrides
        .provider
        .clone()
        .unwrap_or_else(|| doc.claude.provider.clone());

    let proxy = if overrides.has_proxy() {
        let base = doc.proxy.clone().unwrap_or(v0_1::ProxySection {
            http: None,
            https: None,
            no_proxy: None,
        });
        Some(ProxySpec {
            http: overrides.proxy_http.clone().or(base.http),
            https: overrides.proxy_https.clone().or(base.https),
            no_proxy: overrides.no_proxy.clone().or(base.no_proxy),
        })
    } else {
        doc.proxy.as_ref().map(|p| ProxySpec {
            http: p.http.clone(),
            https: p.https.clone(),
            no_proxy: p.no_proxy.clone(),
        })
    };

    // Semantic validation: collect everything before failing.
    if doc.name.is_empty() {
        violations.push(FieldViolation::new("name", "cannot be empty"));
    }
    if doc.workspace.dir.is_empty() {
        violations.push(FieldViolation::new("workspace.dir", "cannot be empty"));
    }
    if doc.docker.image.is_empty() {
        violations.push(FieldViolation::new("docker.image", "cannot be empty"));
    }
    let provider = match Provider::parse(&provider_name) {
        Some(p) => p,
        None => {
            violations.push(FieldViolation::new(
                "claude.provider",
                format!(
                    "'{}' is not a valid provider. Must be one of: {}",
                    provider_name,
                    Provider::valid_names()
                ),
            ));
            Provider::Anthropic
        }
    };
    for plugin in &plugins {
        if !marketplaces.contains_key(&plugin.marketplace) {
            violations.push(FieldViolation::new(
                "plugins",
                format!(
                    "plugin '{}' references unknown marketplace '{}'",
                    plugin.name, plugin.marketplace
                ),
            ));
        }
    }

    if !violations.is_empty() {
        return Err(DevforgeError::validation(violations));
    }

    Ok(ProjectSpec {
        schema_version: SchemaVersion::V0_1,
        name: doc.name,
        template: doc.template,
        workspace_dir: doc.workspace.dir,
        image: doc.docker.image,
        build_args: doc.docker.build_args,
        claude_version,
        provider,
        models: doc.claude.models,
        runtime,
        proxy,
        marketplaces,
        plugins,
        generated_files: doc.git.generated,
    })
}

/// Split `name@marketplace`; names without a qualifier fall back to the
/// preset's sole marketplace when there is exactly one.
fn split_qualified(
    qualified: &str,
    marketplaces: &BTreeMap<String, String>,
) -> Option<(String, String)> {
    if let Some((name, marketplace)) = qualified.split_once('@') {
        if !name.is_empty() && !marketplace.is_empty() {
            return Some((name.to_string(), marketplace.to_string()));
        }
        return None;
    }
    if marketplaces.len() == 1 {
        let marketplace = marketplaces.keys().next().unwrap().clone();
        return Some((qualified.to_string(), marketplace));
    }
    None
}
