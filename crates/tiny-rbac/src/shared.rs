//! Atomically replaceable access model.
//!
//! A built [`AccessModel`] never changes. To pick up a new policy, build a
//! fresh model off to the side and swap the pointer; queries that are already
//! running keep the snapshot they started with.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::actions::Action;
use crate::config::PolicySource;
use crate::error::{BuildError, LoadError, QueryError};
use crate::model::AccessModel;
use crate::policy::Policy;

/// A shared handle to the current access model.
///
/// Reads are lock-free. Cloning the handle is not provided; share it behind
/// an `Arc` so every holder sees the same swaps.
pub struct SharedAccessModel {
    current: ArcSwap<AccessModel>,
}

impl std::fmt::Debug for SharedAccessModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let model = self.current.load();
        f.debug_struct("SharedAccessModel")
            .field("roles", &model.role_names().count())
            .field("resources", &model.resource_names().count())
            .finish()
    }
}

impl SharedAccessModel {
    /// Wrap an initial model.
    pub fn new(model: AccessModel) -> Self {
        Self {
            current: ArcSwap::from_pointee(model),
        }
    }

    /// Build the initial model from `policy`.
    pub fn build(policy: &Policy) -> Result<Self, BuildError> {
        Ok(Self::new(AccessModel::build(policy)?))
    }

    /// Snapshot of the current model.
    ///
    /// Use one snapshot for a group of queries that must agree with each
    /// other.
    pub fn load(&self) -> Arc<AccessModel> {
        self.current.load_full()
    }

    /// Query the current model. See [`AccessModel::check`].
    pub fn check(&self, role: &str, resource: &str, action: &str) -> Result<bool, QueryError> {
        self.current.load().check(role, resource, action)
    }

    /// Query the current model with a parsed action.
    pub fn check_action(
        &self,
        role: &str,
        resource: &str,
        action: Action,
    ) -> Result<bool, QueryError> {
        self.current.load().check_action(role, resource, action)
    }

    /// Query the current model, treating every error as a denial.
    pub fn is_allowed(&self, role: &str, resource: &str, action: &str) -> bool {
        self.current.load().is_allowed(role, resource, action)
    }

    /// Install `model`, returning the one it replaced.
    pub fn replace(&self, model: AccessModel) -> Arc<AccessModel> {
        let roles = model.role_names().count();
        let resources = model.resource_names().count();
        let previous = self.current.swap(Arc::new(model));
        tracing::info!(roles, resources, "access model replaced");
        previous
    }

    /// Build `policy` and install it.
    ///
    /// On failure the current model stays in place.
    pub fn reload_from(&self, policy: &Policy) -> Result<(), BuildError> {
        match AccessModel::build(policy) {
            Ok(model) => {
                self.replace(model);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "policy reload rejected, keeping current model");
                Err(error)
            }
        }
    }

    /// Load `source`, build it, and install it.
    ///
    /// On failure the current model stays in place.
    pub fn reload_from_source(&self, source: &PolicySource) -> Result<(), LoadError> {
        match AccessModel::from_source(source) {
            Ok(model) => {
                self.replace(model);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    path = %source.path.display(),
                    "policy reload rejected, keeping current model"
                );
                Err(error)
            }
        }
    }
}

impl From<AccessModel> for SharedAccessModel {
    fn from(model: AccessModel) -> Self {
        Self::new(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ResourceGrant, Role};

    fn policy(role: &str, actions: &[&str]) -> Policy {
        Policy::new(
            ["instances"],
            vec![Role::new(
                role,
                vec![ResourceGrant::new("instances", actions.iter().copied())],
            )],
        )
    }

    #[test]
    fn test_reload_swaps_model() {
        let shared = SharedAccessModel::build(&policy("Reader", &["GET"])).unwrap();
        assert!(shared.is_allowed("Reader", "instances", "GET"));
        assert!(!shared.is_allowed("Writer", "instances", "POST"));

        shared.reload_from(&policy("Writer", &["POST"])).unwrap();
        assert!(!shared.is_allowed("Reader", "instances", "GET"));
        assert_eq!(shared.check("Writer", "instances", "POST"), Ok(true));
    }

    #[test]
    fn test_failed_reload_keeps_current_model() {
        let shared = SharedAccessModel::build(&policy("Reader", &["GET"])).unwrap();

        let err = shared.reload_from(&Policy::default()).unwrap_err();
        assert_eq!(err.to_string(), "validate policy: no resources");
        assert!(shared.is_allowed("Reader", "instances", "GET"));
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedAccessModel::build(&policy("Reader", &["GET"])).unwrap();
        let snapshot = shared.load();

        let previous = shared.replace(AccessModel::build(&policy("Writer", &["PUT"])).unwrap());

        assert!(Arc::ptr_eq(&snapshot, &previous));
        assert_eq!(snapshot.check("Reader", "instances", "GET"), Ok(true));
        assert_eq!(
            shared.check_action("Writer", "instances", Action::Put),
            Ok(true)
        );
    }

    #[test]
    fn test_reload_from_missing_source_keeps_current_model() {
        let shared = SharedAccessModel::build(&policy("Reader", &["GET"])).unwrap();
        let source = PolicySource::new(
            "does/not/exist.yaml",
            crate::config::PolicyFormat::Yaml,
        );

        let err = shared.reload_from_source(&source).unwrap_err();
        assert_eq!(err.error_code(), "POLICY_OPEN_FAILED");
        assert!(shared.is_allowed("Reader", "instances", "GET"));
    }
}
