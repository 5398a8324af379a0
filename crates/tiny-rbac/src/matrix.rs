//! # Access Matrix
//!
//! Packs the role × action × resource relation into one 64-bit word per
//! (role, action) pair.
//!
//! ```text
//! roles     : r1
//! resources : R1 R2 R3
//! actions   : GET POST PUT PATCH DELETE
//!
//!   resource  R1R2R3  R1R2R3  R1R2R3  R1R2R3  R1R2R3
//!   access   [0 1 1] [0 0 1] [0 0 0] [0 0 0] [1 1 1]
//!   action    -GET--  -POST-  -PUT--  -PATCH  DELETE
//!   role      ----------------r1--------------------
//! ```
//!
//! Role r1 may GET R2 and R3, POST R3 only, neither PUT nor PATCH anything,
//! and DELETE everything.

use std::fmt;

use crate::actions::Action;
use crate::index::{ResourceIndex, RoleIndex};
use crate::policy::Policy;
use crate::{MAX_ACTIONS, MAX_RESOURCES, MAX_ROLES};

/// Number of cells in the matrix.
pub const MATRIX_CELLS: usize = MAX_ROLES * MAX_ACTIONS;

/// A set of resource indexes, one bit per resource.
///
/// The word is exactly [`MAX_RESOURCES`] bits wide.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResourceSet(u64);

impl ResourceSet {
    /// No resources.
    pub const EMPTY: ResourceSet = ResourceSet(0);

    /// Every slot the set can represent.
    ///
    /// Wildcard grants store this value, so they also cover slots that no
    /// named resource occupies. Resources are fixed once a model is built,
    /// so the extra bits can only be observed through
    /// [`AccessModel::check_index`](crate::model::AccessModel::check_index).
    pub const ALL: ResourceSet = ResourceSet(u64::MAX);

    /// Wrap a raw bit pattern.
    pub const fn from_bits(bits: u64) -> Self {
        ResourceSet(bits)
    }

    /// The raw bit pattern.
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// A set holding only `index`, or `None` past the bitset width.
    pub fn single(index: usize) -> Option<Self> {
        (index < MAX_RESOURCES).then(|| ResourceSet(1 << index))
    }

    /// Check if `index` is in the set. Indexes past the width are never in it.
    pub fn contains(&self, index: usize) -> bool {
        index < MAX_RESOURCES && self.0 & (1 << index) != 0
    }

    /// Add every index in `other`.
    pub fn insert_all(&mut self, other: ResourceSet) {
        self.0 |= other.0;
    }

    /// Number of indexes in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Indexes in ascending order.
    pub fn indexes(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..MAX_RESOURCES).filter(move |i| bits & (1 << i) != 0)
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceSet({:#066b})", self.0)
    }
}

/// The packed permission table.
///
/// Cell `role * MAX_ACTIONS + action.offset()` holds the resources that role
/// may perform that action on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMatrix {
    cells: [ResourceSet; MATRIX_CELLS],
}

impl Default for AccessMatrix {
    fn default() -> Self {
        Self {
            cells: [ResourceSet::EMPTY; MATRIX_CELLS],
        }
    }
}

impl AccessMatrix {
    /// Pack the grants of a validated policy.
    ///
    /// Grants are OR-ed into their cells, so repeated or reordered grants
    /// produce the same matrix. A wildcard grant replaces its cell with
    /// [`ResourceSet::ALL`], which already contains anything else.
    pub fn build(policy: &Policy, roles: &RoleIndex, resources: &ResourceIndex) -> Self {
        let mut matrix = Self::default();

        for role in &policy.roles {
            let Some(role_idx) = roles.position(&role.name) else {
                continue;
            };

            for grant in &role.grants {
                let granted = if grant.is_wildcard() {
                    ResourceSet::ALL
                } else {
                    match resources.position(&grant.resource).and_then(ResourceSet::single) {
                        Some(set) => set,
                        None => continue,
                    }
                };

                let mut contributed = false;
                for action in grant.resolved_actions() {
                    matrix.cells[Self::cell(role_idx, action)].insert_all(granted);
                    contributed = true;
                }

                if !contributed {
                    tracing::debug!(
                        role = %role.name,
                        resource = %grant.resource,
                        "grant has no actions, skipping"
                    );
                }
            }
        }

        matrix
    }

    fn cell(role_idx: usize, action: Action) -> usize {
        role_idx * MAX_ACTIONS + action.offset()
    }

    /// Resources `role_idx` may perform `action` on.
    ///
    /// Rows past [`MAX_ROLES`] are empty.
    pub fn get(&self, role_idx: usize, action: Action) -> ResourceSet {
        if role_idx >= MAX_ROLES {
            return ResourceSet::EMPTY;
        }
        self.cells[Self::cell(role_idx, action)]
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> &[ResourceSet; MATRIX_CELLS] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::assign;
    use crate::policy::{ResourceGrant, Role};

    fn build(policy: &Policy) -> AccessMatrix {
        let (roles, resources) = assign(policy);
        AccessMatrix::build(policy, &roles, &resources)
    }

    #[test]
    fn test_resource_set_bits() {
        let mut set = ResourceSet::single(0).unwrap();
        set.insert_all(ResourceSet::single(63).unwrap());

        assert!(set.contains(0));
        assert!(set.contains(63));
        assert!(!set.contains(1));
        assert!(!set.contains(64));
        assert_eq!(set.len(), 2);
        assert_eq!(set.indexes().collect::<Vec<_>>(), vec![0, 63]);
        assert_eq!(ResourceSet::single(64), None);
    }

    #[test]
    fn test_all_covers_every_slot() {
        assert_eq!(ResourceSet::ALL.len(), MAX_RESOURCES);
        assert!((0..MAX_RESOURCES).all(|i| ResourceSet::ALL.contains(i)));
        assert!(ResourceSet::EMPTY.is_empty());
    }

    #[test]
    fn test_concrete_grants_accumulate() {
        let policy = Policy::new(
            ["a", "b", "c"],
            vec![Role::new(
                "Reader",
                vec![
                    ResourceGrant::new("a", ["GET"]),
                    ResourceGrant::new("c", ["GET", "POST"]),
                    ResourceGrant::new("a", ["GET"]),
                ],
            )],
        );
        let matrix = build(&policy);

        assert_eq!(matrix.get(0, Action::Get).bits(), 0b101);
        assert_eq!(matrix.get(0, Action::Post).bits(), 0b100);
        assert!(matrix.get(0, Action::Delete).is_empty());
    }

    #[test]
    fn test_wildcard_sets_all_bits() {
        let policy = Policy::new(
            ["a", "b"],
            vec![Role::new(
                "Admin",
                vec![
                    ResourceGrant::new("a", ["PUT"]),
                    ResourceGrant::wildcard(["PUT", "PATCH"]),
                    ResourceGrant::new("b", ["PUT"]),
                ],
            )],
        );
        let matrix = build(&policy);

        assert_eq!(matrix.get(0, Action::Put), ResourceSet::ALL);
        assert_eq!(matrix.get(0, Action::Patch), ResourceSet::ALL);
        assert_eq!(matrix.get(0, Action::Get), ResourceSet::EMPTY);
    }

    #[test]
    fn test_blank_only_grant_contributes_nothing() {
        let policy = Policy::new(
            ["a"],
            vec![Role::new(
                "Idle",
                vec![ResourceGrant::new("a", ["", ""]), ResourceGrant::wildcard([""])],
            )],
        );
        let matrix = build(&policy);
        assert!(matrix.cells().iter().all(ResourceSet::is_empty));
    }

    #[test]
    fn test_rows_follow_sorted_role_order() {
        let policy = Policy::new(
            ["a", "b"],
            vec![
                Role::new("zeta", vec![ResourceGrant::new("b", ["DELETE"])]),
                Role::new("alpha", vec![ResourceGrant::new("a", ["GET"])]),
            ],
        );
        let matrix = build(&policy);

        assert_eq!(matrix.cells()[0].bits(), 0b01);
        assert_eq!(matrix.cells()[MAX_ACTIONS + 4].bits(), 0b10);
        assert!(matrix.get(MAX_ROLES, Action::Get).is_empty());
    }
}
