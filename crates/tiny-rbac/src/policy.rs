//! # Policy
//!
//! The declarative policy a model is built from, as decoded from JSON or
//! YAML, and the structural validation run before it is trusted.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::actions::Action;
use crate::error::ValidationError;
use crate::{MAX_RESOURCES, MAX_ROLES, WILDCARD};

/// A complete access policy.
///
/// # Example
///
/// ```
/// use tiny_rbac::policy::{Policy, ResourceGrant, Role};
///
/// let policy = Policy::new(
///     ["instances", "applications"],
///     vec![Role::new("Auditor", vec![ResourceGrant::new("applications", ["GET"])])],
/// );
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Free text, informational only.
    #[serde(default, alias = "Description", deserialize_with = "null_as_default")]
    pub description: String,

    /// Resource names the policy protects. Duplicates and empty strings are
    /// tolerated and filtered out.
    #[serde(default, alias = "Resources", deserialize_with = "null_as_default")]
    pub resources: Vec<String>,

    /// Roles in declaration order.
    #[serde(default, alias = "Roles", deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
}

/// A named actor category and the grants it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, non-empty and unique within the policy.
    #[serde(default, alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,

    /// Free text, informational only.
    #[serde(default, alias = "Description", deserialize_with = "null_as_default")]
    pub description: String,

    /// Resource grants in declaration order.
    #[serde(
        rename = "resources",
        alias = "Resources",
        default,
        deserialize_with = "null_as_default"
    )]
    pub grants: Vec<ResourceGrant>,
}

/// Actions a role may perform on one resource, or on every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrant {
    /// A resource name from [`Policy::resources`], or [`WILDCARD`].
    #[serde(
        rename = "name",
        alias = "Name",
        default,
        deserialize_with = "null_as_default"
    )]
    pub resource: String,

    /// HTTP action names. Empty strings are dropped.
    #[serde(default, alias = "Actions", deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
}

/// Decode `null` as the field's default, so `resources:` with no value in
/// YAML reads as an empty list.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Policy {
    /// Create a policy from resource names and roles.
    pub fn new<I, S>(resources: I, roles: Vec<Role>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: String::new(),
            resources: resources.into_iter().map(Into::into).collect(),
            roles,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The deduplicated, non-empty resource names, in byte order.
    pub fn unique_resources(&self) -> BTreeSet<&str> {
        self.resources
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Check the policy for structural consistency.
    ///
    /// Validations run in the order below and the first failure is returned:
    /// 1. No resources.
    /// 2. More unique resources than [`MAX_RESOURCES`].
    /// 3. No roles.
    /// 4. Per role, in declaration order: empty name, repeated name, no
    ///    grants, a grant on an undefined resource, a grant with an
    ///    unrecognized action.
    /// 5. More roles than [`MAX_ROLES`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let resources = self.unique_resources();
        if resources.is_empty() {
            return Err(ValidationError::NoResources);
        }

        let blank = self.resources.iter().filter(|name| name.is_empty()).count();
        if blank > 0 {
            tracing::debug!(blank, "dropping blank resource names");
        }

        if resources.len() > MAX_RESOURCES {
            return Err(ValidationError::TooManyResources {
                max: MAX_RESOURCES,
                actual: resources.len(),
            });
        }

        if self.roles.is_empty() {
            return Err(ValidationError::NoRoles);
        }

        let mut seen = HashSet::with_capacity(self.roles.len());
        for (index, role) in self.roles.iter().enumerate() {
            if role.name.is_empty() {
                return Err(ValidationError::EmptyRoleName { index });
            }

            if !seen.insert(role.name.as_str()) {
                return Err(ValidationError::DuplicateRoleName {
                    role: role.name.clone(),
                });
            }

            if role.grants.is_empty() {
                return Err(ValidationError::EmptyRoleResources {
                    role: role.name.clone(),
                });
            }

            for grant in &role.grants {
                if !grant.is_wildcard() && !resources.contains(grant.resource.as_str()) {
                    return Err(ValidationError::UndefinedResource {
                        resource: grant.resource.clone(),
                        role: role.name.clone(),
                    });
                }

                if let Some(action) = grant.action_names().find(|a| Action::parse(a).is_none()) {
                    return Err(ValidationError::UnknownAction {
                        action: action.to_string(),
                        role: role.name.clone(),
                    });
                }
            }
        }

        if self.roles.len() > MAX_ROLES {
            return Err(ValidationError::TooManyRoles {
                max: MAX_ROLES,
                actual: self.roles.len(),
            });
        }

        Ok(())
    }
}

impl Role {
    /// Create a role with the given grants.
    pub fn new(name: impl Into<String>, grants: Vec<ResourceGrant>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            grants,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl ResourceGrant {
    /// Create a grant of `actions` on `resource`.
    pub fn new<I, S>(resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource: resource.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a grant of `actions` on every resource.
    pub fn wildcard<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(WILDCARD, actions)
    }

    /// Check if this grant covers every resource.
    pub fn is_wildcard(&self) -> bool {
        self.resource == WILDCARD
    }

    /// Non-empty action names, in declaration order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .map(String::as_str)
            .filter(|action| !action.is_empty())
    }

    /// Recognized actions, in declaration order.
    ///
    /// Unrecognized names are skipped here; [`Policy::validate`] is where
    /// they are reported.
    pub fn resolved_actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.action_names().filter_map(Action::parse)
    }
}
