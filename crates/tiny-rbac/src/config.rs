//! Policy sources and decoding.
//!
//! Reads a policy document from disk or memory and decodes it as JSON or
//! YAML. Which file to read can be taken from environment variables so a
//! service can point at its policy without code changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::policy::Policy;

/// Environment variable naming the policy file.
pub const POLICY_PATH_ENV: &str = "RBAC_POLICY_PATH";

/// Environment variable overriding the policy format.
pub const POLICY_FORMAT_ENV: &str = "RBAC_POLICY_FORMAT";

/// Serialization format of a policy document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl PolicyFormat {
    /// Get the string representation of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyFormat::Json => "json",
            PolicyFormat::Yaml => "yaml",
        }
    }

    /// Parse a format name (case-insensitive; `yml` is accepted for YAML).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(PolicyFormat::Json),
            "yaml" | "yml" => Some(PolicyFormat::Yaml),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Decode `data` as a policy. `origin` names the document in errors.
    pub fn decode(&self, data: &str, origin: &str) -> Result<Policy, ConfigError> {
        let decoded: Result<Policy, String> = match self {
            #[cfg(feature = "json")]
            PolicyFormat::Json => serde_json::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml")]
            PolicyFormat::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            #[allow(unreachable_patterns)]
            _ => return Err(ConfigError::UnsupportedFormat(self.as_str().to_string())),
        };

        decoded.map_err(|message| ConfigError::Decode {
            format: *self,
            origin: origin.to_string(),
            message,
        })
    }
}

impl fmt::Display for PolicyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a policy lives and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySource {
    /// Path to the policy document.
    pub path: PathBuf,

    /// Document format.
    pub format: PolicyFormat,
}

impl PolicySource {
    /// Create a source with an explicit format.
    pub fn new(path: impl Into<PathBuf>, format: PolicyFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Create a source, inferring the format from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::PathNotProvided);
        }
        let format = PolicyFormat::from_path(&path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        Ok(Self { path, format })
    }

    /// Load the source from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_POLICY_PATH`: path to the policy document (required)
    /// - `RBAC_POLICY_FORMAT`: `json` or `yaml` (default: inferred from the
    ///   file extension)
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(POLICY_PATH_ENV)
            .map_err(|_| ConfigError::MissingEnvVar(POLICY_PATH_ENV.to_string()))?;

        match std::env::var(POLICY_FORMAT_ENV) {
            Ok(format) => {
                let format = PolicyFormat::parse(&format)
                    .ok_or(ConfigError::UnsupportedFormat(format))?;
                Ok(Self::new(path, format))
            }
            Err(_) => Self::from_path(path),
        }
    }

    /// Read and decode the policy.
    pub fn load(&self) -> Result<Policy, ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::PathNotProvided);
        }

        let mut file = File::open(&self.path).map_err(|source| ConfigError::Open {
            format: self.format,
            path: self.path.clone(),
            source,
        })?;

        let mut data = String::new();
        file.read_to_string(&mut data)
            .map_err(|source| ConfigError::Read {
                format: self.format,
                path: self.path.clone(),
                source,
            })?;

        let policy = self
            .format
            .decode(&data, &format!("{:?}", self.path))?;

        tracing::debug!(
            path = %self.path.display(),
            format = %self.format,
            roles = policy.roles.len(),
            resources = policy.resources.len(),
            "policy decoded"
        );

        Ok(policy)
    }
}

impl Policy {
    /// Decode a policy from a JSON document.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        PolicyFormat::Json.decode(data, "<string>")
    }

    /// Decode a policy from a YAML document.
    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        PolicyFormat::Yaml.decode(data, "<string>")
    }
}
