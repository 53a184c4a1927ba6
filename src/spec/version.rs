//! Schema version handling for the specification document.
//!
//! The `version` field selects which parsing and defaulting routine applies.
//! An unrecognized version is rejected before any other field is read and
//! before anything is written to disk.

use crate::error::{DevforgeError, Result};

/// Versions this build knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Version 0.1, the initial schema.
    V0_1,
}

/// Comma-separated list of recognized versions, for error messages.
pub const SUPPORTED_VERSIONS: &str = "0.1";

impl SchemaVersion {
    /// Parse a version string like "0.1".
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "0.1" => Ok(SchemaVersion::V0_1),
            _ => Err(DevforgeError::UnsupportedSchemaVersion {
                found: s.to_string(),
                supported: SUPPORTED_VERSIONS.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V0_1 => "0.1",
        }
    }

    pub fn is_supported(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// The version written into newly generated documents.
    pub const fn current() -> Self {
        SchemaVersion::V0_1
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for SchemaVersion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
