//! Error types for policy loading, validation, and access queries
//!
//! Construction errors ([`ConfigError`], [`ValidationError`], [`BuildError`],
//! [`LoadError`]) abort a build; no partial model is ever returned.
//! [`QueryError`] is per-call and never fatal.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::PolicyFormat;

/// Errors raised while locating, reading, or decoding a policy document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No policy path was given
    #[error("policy file path is empty")]
    PathNotProvided,

    /// Missing required environment variable
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// The policy format could not be determined or is not compiled in
    #[error("unsupported policy format: {0}")]
    UnsupportedFormat(String),

    /// The policy file could not be opened
    #[error("open {format} policy {path:?}: {source}")]
    Open {
        /// Declared document format.
        format: PolicyFormat,
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The policy file was opened but could not be read
    #[error("read {format} policy {path:?}: {source}")]
    Read {
        /// Declared document format.
        format: PolicyFormat,
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document is not a well-formed policy
    #[error("decode {format} policy {origin}: {message}")]
    Decode {
        /// Declared document format.
        format: PolicyFormat,
        /// Where the document came from (a quoted path, or `<string>`).
        origin: String,
        /// Decoder message.
        message: String,
    },
}

impl ConfigError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::PathNotProvided => "POLICY_PATH_NOT_PROVIDED",
            ConfigError::MissingEnvVar(_) => "MISSING_ENV_VAR",
            ConfigError::UnsupportedFormat(_) => "UNSUPPORTED_POLICY_FORMAT",
            ConfigError::Open { .. } => "POLICY_OPEN_FAILED",
            ConfigError::Read { .. } => "POLICY_READ_FAILED",
            ConfigError::Decode { .. } => "POLICY_DECODE_FAILED",
        }
    }
}

/// Structural problems found in a decoded policy.
///
/// Checks run in a fixed order and stop at the first failure, so the variant
/// returned for a policy with several problems is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The policy declares no non-empty resource names
    #[error("no resources")]
    NoResources,

    /// More unique resources than a bitset row can hold
    #[error("resources exceeded: maximum {max} but policy has {actual}")]
    TooManyResources {
        /// Capacity of the access matrix.
        max: usize,
        /// Unique, non-empty resource names in the policy.
        actual: usize,
    },

    /// The policy declares no roles
    #[error("no roles")]
    NoRoles,

    /// More roles than the access matrix has rows for
    #[error("roles exceeded: maximum {max} but policy has {actual}")]
    TooManyRoles {
        /// Capacity of the access matrix.
        max: usize,
        /// Roles declared in the policy.
        actual: usize,
    },

    /// A role has an empty name
    #[error("empty role: name not defined at index {index}")]
    EmptyRoleName {
        /// Position of the role in declaration order.
        index: usize,
    },

    /// A role name appears more than once
    #[error("duplicate role: {role} is defined more than once")]
    DuplicateRoleName {
        /// The repeated role name.
        role: String,
    },

    /// A role has no resource grants
    #[error("empty resources: not defined for role {role}")]
    EmptyRoleResources {
        /// The offending role.
        role: String,
    },

    /// A grant names a resource missing from the policy's resource list
    #[error("undefined resource: {resource} for role {role}: {resource} not defined in resources")]
    UndefinedResource {
        /// The undefined resource name.
        resource: String,
        /// The role holding the grant.
        role: String,
    },

    /// A grant names an action outside the HTTP action table
    #[error("unknown action: {action} for role {role}")]
    UnknownAction {
        /// The unrecognized action name.
        action: String,
        /// The role holding the grant.
        role: String,
    },
}

impl ValidationError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::NoResources => "NO_RESOURCES",
            ValidationError::TooManyResources { .. } => "TOO_MANY_RESOURCES",
            ValidationError::NoRoles => "NO_ROLES",
            ValidationError::TooManyRoles { .. } => "TOO_MANY_ROLES",
            ValidationError::EmptyRoleName { .. } => "EMPTY_ROLE_NAME",
            ValidationError::DuplicateRoleName { .. } => "DUPLICATE_ROLE_NAME",
            ValidationError::EmptyRoleResources { .. } => "EMPTY_ROLE_RESOURCES",
            ValidationError::UndefinedResource { .. } => "UNDEFINED_RESOURCE",
            ValidationError::UnknownAction { .. } => "UNKNOWN_ACTION",
        }
    }
}

/// Failure to build an access model from a decoded policy.
///
/// Given a structurally valid policy the build is infallible, so the only
/// cause is a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The policy failed validation
    #[error("validate policy: {0}")]
    Validation(#[from] ValidationError),
}

impl BuildError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            BuildError::Validation(e) => e.error_code(),
        }
    }
}

/// Failure to go from a policy source all the way to an access model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The policy could not be read or decoded
    #[error("read policy: {0}")]
    Config(#[from] ConfigError),

    /// The decoded policy could not be built
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl LoadError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            LoadError::Config(e) => e.error_code(),
            LoadError::Build(e) => e.error_code(),
        }
    }
}

/// Per-call failures of an access query.
///
/// Every query that fails also means "not allowed"; the error lets callers
/// tell a denial apart from an identifier the model has never heard of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The role is not part of the model
    #[error("unknown role: {role}")]
    UnknownRole {
        /// The role that was queried.
        role: String,
    },

    /// The resource is not part of the model
    #[error("unknown resource: {resource}")]
    UnknownResource {
        /// The resource that was queried.
        resource: String,
    },

    /// The action is not one of the HTTP actions the model knows
    #[error("unknown action: {action}")]
    UnknownAction {
        /// The action that was queried.
        action: String,
    },

    /// A raw resource index lies outside the bitset width
    #[error("resource index out of range: {index} (maximum {max})")]
    ResourceIndexOutOfRange {
        /// The index that was queried.
        index: usize,
        /// Width of a resource bitset.
        max: usize,
    },
}

impl QueryError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::UnknownRole { .. } => "UNKNOWN_ROLE",
            QueryError::UnknownResource { .. } => "UNKNOWN_RESOURCE",
            QueryError::UnknownAction { .. } => "UNKNOWN_ACTION",
            QueryError::ResourceIndexOutOfRange { .. } => "RESOURCE_INDEX_OUT_OF_RANGE",
        }
    }

    /// Get HTTP status code a caller would typically map this error to.
    ///
    /// An unknown role is a caller the policy does not recognize (403); an
    /// unknown resource or action is a target it does not cover (404).
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::UnknownRole { .. } => 403,
            QueryError::UnknownResource { .. } | QueryError::ResourceIndexOutOfRange { .. } => 404,
            QueryError::UnknownAction { .. } => 405,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::NoResources.to_string(), "no resources");
        assert_eq!(ValidationError::NoRoles.to_string(), "no roles");
        assert_eq!(
            ValidationError::TooManyResources { max: 64, actual: 65 }.to_string(),
            "resources exceeded: maximum 64 but policy has 65"
        );
        assert_eq!(
            ValidationError::TooManyRoles { max: 20, actual: 21 }.to_string(),
            "roles exceeded: maximum 20 but policy has 21"
        );
        assert_eq!(
            ValidationError::EmptyRoleName { index: 2 }.to_string(),
            "empty role: name not defined at index 2"
        );
        assert_eq!(
            ValidationError::UndefinedResource {
                resource: "orders".to_string(),
                role: "Auditor".to_string(),
            }
            .to_string(),
            "undefined resource: orders for role Auditor: orders not defined in resources"
        );
    }

    #[test]
    fn test_query_messages() {
        let err = QueryError::UnknownRole {
            role: "Operator".to_string(),
        };
        assert_eq!(err.to_string(), "unknown role: Operator");
        assert_eq!(err.status_code(), 403);

        let err = QueryError::UnknownResource {
            resource: "orders".to_string(),
        };
        assert_eq!(err.to_string(), "unknown resource: orders");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_build_error_wraps_validation() {
        let err = BuildError::from(ValidationError::NoRoles);
        assert_eq!(err.to_string(), "validate policy: no roles");
        assert_eq!(err.error_code(), "NO_ROLES");

        let err = LoadError::from(err);
        assert_eq!(err.to_string(), "validate policy: no roles");
    }

    #[test]
    fn test_config_error_messages_name_format_and_path() {
        let err = ConfigError::Open {
            format: PolicyFormat::Json,
            path: PathBuf::from("missing.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "open json policy \"missing.json\": not found");
        assert_eq!(err.error_code(), "POLICY_OPEN_FAILED");

        let err = LoadError::from(ConfigError::PathNotProvided);
        assert_eq!(err.to_string(), "read policy: policy file path is empty");
    }
}
