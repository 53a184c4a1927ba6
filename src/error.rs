use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single failed validation check, identified by the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one validation pass.
///
/// Validation never stops at the first problem; the caller gets every
/// offending field in a single error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationList(pub Vec<FieldViolation>);

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum DevforgeError {
    #[error("Unsupported schema version '{found}'. Supported versions: {supported}")]
    UnsupportedSchemaVersion { found: String, supported: String },

    #[error("Invalid specification:\n{0}")]
    Validation(ViolationList),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error(
        "Language version '{requested}' is not supported by template '{template}'. \
         Supported versions: {supported}"
    )]
    UnsupportedVersion {
        template: String,
        requested: String,
        supported: String,
    },

    #[error("Unresolved token '{{{{{token}}}}}' in template '{template}'")]
    UnresolvedToken { template: String, token: String },

    #[error("Feature bundle not found: {0}")]
    FeatureBundleMissing(String),

    #[error("Settings file {path} is not valid JSON: {reason}")]
    SettingsParse { path: PathBuf, reason: String },

    #[error("Credential file not found: {0}")]
    CredentialNotFound(PathBuf),

    #[error("Git not installed. Install from https://git-scm.com/downloads")]
    GitNotInstalled,

    #[error("Git command failed (git {args}): {stderr}")]
    RepositoryOperation { args: String, stderr: String },

    #[error("Spec parse error: {0}")]
    SpecParse(#[from] toml::de::Error),

    #[error("Spec encode error: {0}")]
    SpecEncode(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DevforgeError {
    /// Build an aggregate validation error from collected violations.
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        DevforgeError::Validation(ViolationList(violations))
    }
}

pub type Result<T> = std::result::Result<T, DevforgeError>;
