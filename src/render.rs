//! Template substitution.
//!
//! Templates contain `{{TOKEN}}` placeholders (uppercase ASCII, digits,
//! underscore). A [`TokenTable`] is derived once per resolved spec; rendering
//! looks every token up in that table and fails on the first token with no
//! entry, naming it. An empty string is a defined value — the failure mode
//! exists so a literal `{{TOKEN}}` can never leak into generated output.
//! Anything between doubled braces that does not match the token grammar
//! (e.g. `${localEnv:USER}` fragments or nested JSON braces) passes through
//! untouched.

use std::collections::BTreeMap;

use crate::error::{DevforgeError, Result};
use crate::spec::ProjectSpec;

/// Fallback bypass list when no proxy section is configured.
const DEFAULT_NO_PROXY: &str = "localhost,127.0.0.1,.local";

/// Map a runtime language name to its version token.
pub fn language_version_token(language: &str) -> Option<&'static str> {
    match language {
        "python" => Some("PYTHON_VERSION"),
        "node" | "nodejs" | "javascript" => Some("NODE_VERSION"),
        "rust" => Some("RUST_VERSION"),
        "go" | "golang" => Some("GO_VERSION"),
        _ => None,
    }
}

/// The resolution table for one spec. Built once, then shared by every
/// template rendered during the run.
#[derive(Debug, Clone)]
pub struct TokenTable {
    entries: BTreeMap<String, String>,
}

impl TokenTable {
    pub fn from_spec(spec: &ProjectSpec) -> Self {
        let mut entries = BTreeMap::new();
        let mut set = |key: &str, value: String| {
            entries.insert(key.to_string(), value);
        };

        set("PROJECT_NAME", spec.name.clone());
        set("BASE_IMAGE", spec.image.clone());

        let build_args = spec
            .build_args
            .iter()
            .map(|arg| format!("ARG {}", arg))
            .collect::<Vec<_>>()
            .join("\n");
        set("BUILD_ARGS", build_args);

        let lang_version_arg = match &spec.runtime {
            Some(runtime) => match language_version_token(&runtime.language) {
                Some(token) => format!("ARG {}={}", token, runtime.version),
                None => String::new(),
            },
            None => String::new(),
        };
        set("LANG_VERSION_ARG", lang_version_arg);

        set("CLAUDE_VERSION", spec.claude_version.clone());
        set("CLAUDE_PROVIDER", spec.provider.as_str().to_string());
        // BTreeMap keys serialize in sorted order, keeping output stable.
        let models_json =
            serde_json::to_string(&spec.models).unwrap_or_else(|_| "{}".to_string());
        set("CLAUDE_MODELS", models_json);

        set(
            "PROXY_ENABLED",
            if spec.proxy.is_some() { "true" } else { "false" }.to_string(),
        );
        match &spec.proxy {
            Some(proxy) => {
                set("HTTP_PROXY", proxy.http.clone().unwrap_or_default());
                set("HTTPS_PROXY", proxy.https.clone().unwrap_or_default());
                set(
                    "NO_PROXY",
                    proxy
                        .no_proxy
                        .clone()
                        .unwrap_or_else(|| DEFAULT_NO_PROXY.to_string()),
                );
            }
            None => {
                set("HTTP_PROXY", String::new());
                set("HTTPS_PROXY", String::new());
                set("NO_PROXY", DEFAULT_NO_PROXY.to_string());
            }
        }

        set("FEATURES_PROXY", "./features/proxy".to_string());
        set("FEATURES_CLAUDE_CODE", "./features/claude-code".to_string());
        set(
            "FEATURES_PLUGIN_MANAGER",
            "./features/plugin-manager".to_string(),
        );

        let activate: Vec<&String> = spec
            .plugins
            .iter()
            .filter(|p| p.activate)
            .map(|p| &p.name)
            .collect();
        let deactivate: Vec<&String> = spec
            .plugins
            .iter()
            .filter(|p| !p.activate)
            .map(|p| &p.name)
            .collect();
        set(
            "ACTIVATE_PLUGINS",
            serde_json::to_string(&activate).unwrap_or_else(|_| "[]".to_string()),
        );
        set(
            "DEACTIVATE_PLUGINS",
            serde_json::to_string(&deactivate).unwrap_or_else(|_| "[]".to_string()),
        );

        if let Some(runtime) = &spec.runtime {
            if let Some(token) = language_version_token(&runtime.language) {
                set(token, runtime.version.clone());
            }
        }

        Self { entries }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    #[cfg(test)]
    pub fn insert(&mut self, token: &str, value: &str) {
        self.entries.insert(token.to_string(), value.to_string());
    }
}

/// Render one template against the table.
///
/// `name` identifies the template in error messages.
pub fn render(name: &str, template: &str, table: &TokenTable) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match token_at(after) {
            Some(token) => {
                let value =
                    table
                        .get(token)
                        .ok_or_else(|| DevforgeError::UnresolvedToken {
                            template: name.to_string(),
                            token: token.to_string(),
                        })?;
                out.push_str(value);
                rest = &after[token.len() + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// If `s` starts with a well-formed token body followed by `}}`, return it.
fn token_at(s: &str) -> Option<&str> {
    let end = s.find("}}")?;
    let token = &s[..end];
    if token.is_empty()
        || !token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
    {
        return None;
    }
    Some(token)
}
