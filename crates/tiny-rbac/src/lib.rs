//! # Tiny RBAC
//!
//! Bitmap-backed role-based access control for embedding inside a service
//! process.
//!
//! ## Overview
//!
//! A policy names resources, roles, and the HTTP actions each role may
//! perform on each resource. The crate handles:
//! - **Policies**: Decoding from JSON or YAML and structural validation
//! - **Indexes**: Dense, sorted positions for role and resource names
//! - **Access Matrix**: One 64-bit resource set per (role, action) pair
//! - **Checks**: Constant-time answers to "may role do action on resource?"
//! - **Hot Swap**: Replacing the built model while readers keep querying
//!
//! ## Architecture
//!
//! ```text
//! Policy ──validate──▶ NameIndex (roles, resources) ──▶ AccessMatrix
//!                                                           │
//!                                 AccessModel::check ◀──────┘
//! ```
//!
//! Capacities are fixed: at most [`MAX_ROLES`] roles, [`MAX_RESOURCES`]
//! resources and [`MAX_ACTIONS`] actions, so a built model is a handful of
//! flat arrays with no per-query allocation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tiny_rbac::AccessModel;
//!
//! let model = AccessModel::from_yaml_file("rbac.yaml").unwrap();
//!
//! match model.check("Auditor", "audit-logs", "GET") {
//!     Ok(true) => { /* allowed */ }
//!     Ok(false) => { /* denied */ }
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Policy Format
//!
//! ```yaml
//! resources: [instances, applications, audit-logs]
//! roles:
//!   - name: Admin
//!     resources:
//!       - name: "*"
//!         actions: [GET, POST, PUT, PATCH, DELETE]
//!   - name: Auditor
//!     resources:
//!       - name: audit-logs
//!         actions: [GET]
//! ```
//!
//! The resource name `*` grants its actions on every resource.
//!
//! ## Features
//!
//! - `json` (default): JSON policy documents via serde_json
//! - `yaml` (default): YAML policy documents via serde_yaml

pub mod actions;
pub mod config;
pub mod error;
pub mod index;
pub mod matrix;
pub mod model;
pub mod policy;
pub mod shared;

/// Maximum number of roles in a policy.
pub const MAX_ROLES: usize = 20;

/// Number of HTTP actions a role can be granted.
pub const MAX_ACTIONS: usize = 5;

/// Maximum number of unique resources in a policy; the width of a resource
/// bitset.
pub const MAX_RESOURCES: usize = 64;

/// Resource name that grants actions on every resource.
pub const WILDCARD: &str = "*";

// Re-export main types for convenience
pub use actions::Action;
pub use config::{PolicyFormat, PolicySource};
pub use error::{BuildError, ConfigError, LoadError, QueryError, ValidationError};
pub use index::{NameIndex, ResourceIndex, RoleIndex};
pub use matrix::{AccessMatrix, ResourceSet};
pub use model::AccessModel;
pub use policy::{Policy, ResourceGrant, Role};
pub use shared::SharedAccessModel;
