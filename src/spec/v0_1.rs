//! Raw document structs for schema version 0.1.
//!
//! These mirror the on-disk `devforge.toml` shape. Field defaults are applied
//! here; semantic validation happens in the resolver so that every violation
//! is collected before anything fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed, unvalidated specification document (schema 0.1).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpecDocument {
    /// Schema version tag. Must be "0.1" for this schema.
    pub version: String,

    /// Project name.
    pub name: String,

    /// Template to render from. The original layout used an implicit generic
    /// template; recording it keeps re-generation reproducible.
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default)]
    pub workspace: WorkspaceSection,

    pub docker: DockerSection,

    #[serde(default)]
    pub claude: ClaudeSection,

    pub runtime: Option<RuntimeSection>,

    pub proxy: Option<ProxySection>,

    #[serde(default)]
    pub marketplaces: BTreeMap<String, MarketplaceSection>,

    #[serde(default)]
    pub plugins: Vec<PluginSection>,

    #[serde(default)]
    pub git: GitSection,
}

fn default_template() -> String {
    "generic".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceSection {
    /// Workspace directory, relative to the project root.
    #[serde(default = "default_workspace_dir")]
    pub dir: String,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> String {
    "./project".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerSection {
    /// Base container image reference.
    pub image: String,

    /// Extra ARG names passed through to the Dockerfile.
    #[serde(default)]
    pub build_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaudeSection {
    /// Claude Code CLI version to install.
    #[serde(default = "default_claude_version")]
    pub version: String,

    /// API provider name; constrained to the provider enum at resolution.
    #[serde(default = "default_claude_provider")]
    pub provider: String,

    /// Model alias mappings (e.g. "haiku" -> a concrete model id).
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

impl Default for ClaudeSection {
    fn default() -> Self {
        Self {
            version: default_claude_version(),
            provider: default_claude_provider(),
            models: BTreeMap::new(),
        }
    }
}

fn default_claude_version() -> String {
    "latest".to_string()
}

fn default_claude_provider() -> String {
    "anthropic".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeSection {
    pub language: String,
    pub version: String,
    pub package_manager: String,

    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxySection {
    pub http: Option<String>,
    pub https: Option<String>,
    pub no_proxy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceSection {
    /// Marketplace URL (a git hosting URL or custom endpoint).
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginSection {
    /// Marketplace the plugin comes from; must be declared in `marketplaces`.
    pub marketplace: String,

    pub name: String,

    #[serde(default = "default_plugin_activate")]
    pub activate: bool,
}

fn default_plugin_activate() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GitSection {
    #[serde(default)]
    pub generated: GeneratedFilesPolicy,
}

/// How generated files are treated by version control.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedFilesPolicy {
    /// Add generated files to .gitignore.
    #[default]
    Ignored,
    /// Commit generated files as ordinary content.
    Committed,
    /// Mark generated files with linguist-generated in .gitattributes.
    #[serde(rename = "linguist-generated")]
    LinguistGenerated,
}

impl SpecDocument {
    pub fn parse(text: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
