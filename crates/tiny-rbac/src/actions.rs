//! # Actions
//!
//! The closed vocabulary of HTTP actions a policy may grant. Each action owns
//! a fixed offset inside a role's row of the access matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MAX_ACTIONS;

/// HTTP actions that can be granted on resources.
///
/// The discriminant of each variant is its offset within a role's row of the
/// access matrix:
/// - **Get**: offset 0
/// - **Post**: offset 1
/// - **Put**: offset 2
/// - **Patch**: offset 3
/// - **Delete**: offset 4
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Read a resource.
    Get = 0,
    /// Create a resource.
    Post = 1,
    /// Replace a resource.
    Put = 2,
    /// Partially update a resource.
    Patch = 3,
    /// Remove a resource.
    Delete = 4,
}

impl Action {
    /// Every action, in offset order.
    pub const ALL: [Action; MAX_ACTIONS] = [
        Action::Get,
        Action::Post,
        Action::Put,
        Action::Patch,
        Action::Delete,
    ];

    /// Get the method name of the action as it appears in a policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "GET",
            Action::Post => "POST",
            Action::Put => "PUT",
            Action::Patch => "PATCH",
            Action::Delete => "DELETE",
        }
    }

    /// Parse an action from its method name.
    ///
    /// Matching is exact and case-sensitive, the same way HTTP method tokens
    /// are compared. Anything outside the five known methods yields `None`;
    /// it is never folded into a known action.
    ///
    /// # Example
    ///
    /// ```
    /// use tiny_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("GET"), Some(Action::Get));
    /// assert_eq!(Action::parse("PATCH"), Some(Action::Patch));
    /// assert_eq!(Action::parse("get"), None);
    /// assert_eq!(Action::parse("TRACE"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Action::Get),
            "POST" => Some(Action::Post),
            "PUT" => Some(Action::Put),
            "PATCH" => Some(Action::Patch),
            "DELETE" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Offset of this action within a role's row of the access matrix.
    pub fn offset(&self) -> usize {
        *self as usize
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::Get)
    }

    /// Check if this is a destructive action.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
