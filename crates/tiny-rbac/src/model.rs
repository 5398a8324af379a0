//! # Access Model
//!
//! The immutable, queryable result of building a policy. A model is built
//! once and then only read, so any number of threads may query it at the
//! same time without locking.

use std::path::Path;

use crate::actions::Action;
use crate::config::{PolicyFormat, PolicySource};
use crate::error::{BuildError, LoadError, QueryError};
use crate::index::{ResourceIndex, RoleIndex};
use crate::matrix::{AccessMatrix, ResourceSet};
use crate::policy::Policy;
use crate::MAX_RESOURCES;

/// A built access policy.
///
/// # Example
///
/// ```
/// use tiny_rbac::{AccessModel, Policy, ResourceGrant, Role};
///
/// let policy = Policy::new(
///     ["instances", "applications"],
///     vec![
///         Role::new("Admin", vec![ResourceGrant::wildcard(["GET", "POST"])]),
///         Role::new("Auditor", vec![ResourceGrant::new("applications", ["GET"])]),
///     ],
/// );
/// let model = AccessModel::build(&policy).unwrap();
///
/// assert_eq!(model.check("Auditor", "applications", "GET"), Ok(true));
/// assert_eq!(model.check("Auditor", "instances", "GET"), Ok(false));
/// assert!(model.check("Operator", "instances", "GET").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessModel {
    roles: RoleIndex,
    resources: ResourceIndex,
    matrix: AccessMatrix,
}

impl AccessModel {
    /// Validate `policy` and build its access model.
    ///
    /// Nothing is built unless validation passes.
    pub fn build(policy: &Policy) -> Result<Self, BuildError> {
        if let Err(error) = policy.validate() {
            tracing::warn!(%error, "policy rejected");
            return Err(error.into());
        }

        let roles = RoleIndex::assign_roles(policy);
        let resources = ResourceIndex::assign_resources(policy);
        let matrix = AccessMatrix::build(policy, &roles, &resources);

        tracing::info!(
            roles = roles.len(),
            resources = resources.len(),
            "access model built"
        );

        Ok(Self {
            roles,
            resources,
            matrix,
        })
    }

    /// Load, decode, and build the policy described by `source`.
    pub fn from_source(source: &PolicySource) -> Result<Self, LoadError> {
        let policy = source.load()?;
        Ok(Self::build(&policy)?)
    }

    /// Build from a JSON policy file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_source(&PolicySource::new(path.as_ref(), PolicyFormat::Json))
    }

    /// Build from a YAML policy file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_source(&PolicySource::new(path.as_ref(), PolicyFormat::Yaml))
    }

    /// Build from a JSON policy document.
    pub fn from_json_str(data: &str) -> Result<Self, LoadError> {
        let policy = Policy::from_json_str(data)?;
        Ok(Self::build(&policy)?)
    }

    /// Build from a YAML policy document.
    pub fn from_yaml_str(data: &str) -> Result<Self, LoadError> {
        let policy = Policy::from_yaml_str(data)?;
        Ok(Self::build(&policy)?)
    }

    /// Check if `role` may perform `action` on `resource`.
    ///
    /// Lookups are by exact name. The role is resolved first, then the
    /// resource, then the action; the first one that is unknown is reported.
    /// An unknown action is an error, never an alias for a known one.
    pub fn check(&self, role: &str, resource: &str, action: &str) -> Result<bool, QueryError> {
        let role_idx = self.role_position(role)?;
        let resource_idx = self.resource_position(resource)?;
        let action = Action::parse(action).ok_or_else(|| QueryError::UnknownAction {
            action: action.to_string(),
        })?;
        Ok(self.matrix.get(role_idx, action).contains(resource_idx))
    }

    /// Like [`check`](Self::check), treating every error as a denial.
    pub fn is_allowed(&self, role: &str, resource: &str, action: &str) -> bool {
        self.check(role, resource, action).unwrap_or(false)
    }

    /// Like [`check`](Self::check), with an already-parsed action.
    pub fn check_action(
        &self,
        role: &str,
        resource: &str,
        action: Action,
    ) -> Result<bool, QueryError> {
        let role_idx = self.role_position(role)?;
        let resource_idx = self.resource_position(resource)?;
        Ok(self.matrix.get(role_idx, action).contains(resource_idx))
    }

    /// Check access to a raw resource slot.
    ///
    /// Any slot below [`MAX_RESOURCES`] may be queried, including slots no
    /// named resource occupies; only wildcard grants cover those.
    pub fn check_index(
        &self,
        role: &str,
        resource_idx: usize,
        action: Action,
    ) -> Result<bool, QueryError> {
        let role_idx = self.role_position(role)?;
        if resource_idx >= MAX_RESOURCES {
            return Err(QueryError::ResourceIndexOutOfRange {
                index: resource_idx,
                max: MAX_RESOURCES,
            });
        }
        Ok(self.matrix.get(role_idx, action).contains(resource_idx))
    }

    /// Named resources `role` may perform `action` on, in index order.
    pub fn allowed_resources(&self, role: &str, action: Action) -> Result<Vec<&str>, QueryError> {
        let set = self.resource_set(self.role_position(role)?, action);
        Ok(self
            .resources
            .names()
            .enumerate()
            .filter(|(idx, _)| set.contains(*idx))
            .map(|(_, name)| name)
            .collect())
    }

    /// Raw matrix cell for a role index and action.
    pub fn resource_set(&self, role_idx: usize, action: Action) -> ResourceSet {
        self.matrix.get(role_idx, action)
    }

    /// Role names in index order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.roles.names()
    }

    /// Resource names in index order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.resources.names()
    }

    /// Index assigned to a role.
    pub fn role_index(&self, role: &str) -> Option<usize> {
        self.roles.position(role)
    }

    /// Index assigned to a resource.
    pub fn resource_index(&self, resource: &str) -> Option<usize> {
        self.resources.position(resource)
    }

    /// The packed matrix.
    pub fn matrix(&self) -> &AccessMatrix {
        &self.matrix
    }

    fn role_position(&self, role: &str) -> Result<usize, QueryError> {
        self.roles.position(role).ok_or_else(|| QueryError::UnknownRole {
            role: role.to_string(),
        })
    }

    fn resource_position(&self, resource: &str) -> Result<usize, QueryError> {
        self.resources
            .position(resource)
            .ok_or_else(|| QueryError::UnknownResource {
                resource: resource.to_string(),
            })
    }
}
