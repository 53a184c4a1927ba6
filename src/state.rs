//! Container-scoped provider state.
//!
//! The selected provider name is written once at generation time into the
//! generated tree itself (`.devcontainer/provider`), so concurrently running
//! containers never share the marker. At container start the marker is read
//! once and credentials are loaded from a provider-named subdirectory: an
//! `auth` file holding the token and an optional `base_url` file holding the
//! endpoint.

use std::fs;
use std::path::Path;

use crate::error::{DevforgeError, Result};
use crate::spec::Provider;

/// File name of the marker inside the devcontainer directory.
pub const PROVIDER_MARKER_FILE: &str = "provider";

/// Content of the marker for a provider. One name, trailing newline.
pub fn marker_content(provider: Provider) -> String {
    format!("{}\n", provider.as_str())
}

/// Read the provider name back from a generated devcontainer directory.
pub fn read_marker(devcontainer_dir: &Path) -> Result<String> {
    let path = devcontainer_dir.join(PROVIDER_MARKER_FILE);
    let content = fs::read_to_string(&path)?;
    Ok(content.trim().to_string())
}

/// Credentials loaded for one provider at container start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub token: String,
    pub base_url: Option<String>,
}

impl ProviderCredentials {
    /// Load credentials from `<root>/<provider>/`. The `auth` file is
    /// required; `base_url` is optional.
    pub fn load(root: &Path, provider: &str) -> Result<Self> {
        let dir = root.join(provider);
        let auth_path = dir.join("auth");
        if !auth_path.exists() {
            return Err(DevforgeError::CredentialNotFound(auth_path));
        }
        let token = fs::read_to_string(&auth_path)?.trim().to_string();

        let base_url_path = dir.join("base_url");
        let base_url = if base_url_path.exists() {
            Some(fs::read_to_string(&base_url_path)?.trim().to_string())
        } else {
            None
        };

        Ok(Self { token, base_url })
    }

    /// Environment variable pairs to export into the container session.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![("CLAUDE_AUTH_TOKEN", self.token.clone())];
        if let Some(url) = &self.base_url {
            vars.push(("CLAUDE_BASE_URL", url.clone()));
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_content() {
        assert_eq!(marker_content(Provider::Anthropic), "anthropic\n");
        assert_eq!(marker_content(Provider::Bedrock), "bedrock\n");
    }

    #[test]
    fn test_read_marker_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(PROVIDER_MARKER_FILE),
            marker_content(Provider::Vertex),
        )
        .unwrap();
        assert_eq!(read_marker(temp.path()).unwrap(), "vertex");
    }

    #[test]
    fn test_credentials_load_full() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("anthropic");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("auth"), "sk-ant-token\n").unwrap();
        fs::write(dir.join("base_url"), "https://gateway.corp.com\n").unwrap();

        let creds = ProviderCredentials::load(temp.path(), "anthropic").unwrap();
        assert_eq!(creds.token, "sk-ant-token");
        assert_eq!(creds.base_url.as_deref(), Some("https://gateway.corp.com"));
        assert_eq!(creds.env_vars().len(), 2);
    }

    #[test]
    fn test_credentials_base_url_optional() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("bedrock");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("auth"), "aws-creds").unwrap();

        let creds = ProviderCredentials::load(temp.path(), "bedrock").unwrap();
        assert_eq!(creds.token, "aws-creds");
        assert!(creds.base_url.is_none());
        assert_eq!(creds.env_vars(), vec![("CLAUDE_AUTH_TOKEN", "aws-creds".to_string())]);
    }

    #[test]
    fn test_credentials_missing_auth_is_error() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("azure")).unwrap();

        let err = ProviderCredentials::load(temp.path(), "azure").unwrap_err();
        assert!(matches!(err, DevforgeError::CredentialNotFound(_)));
        assert!(err.to_string().contains("azure"));
    }
}
