//! # Dense Name Indexes
//!
//! Maps role and resource names to the compact integer positions used to
//! address the access matrix. Positions are assigned by sorted order, so the
//! mapping depends only on the set of names, never on declaration order.

use crate::policy::Policy;
use crate::{MAX_RESOURCES, MAX_ROLES};

/// Role name → row index.
pub type RoleIndex = NameIndex<MAX_ROLES>;

/// Resource name → bit index.
pub type ResourceIndex = NameIndex<MAX_RESOURCES>;

/// A fixed-capacity table of sorted, unique names.
///
/// Slots past [`NameIndex::len`] hold the empty-string sentinel. Real names
/// are never empty, and [`NameIndex::position`] refuses to look up `""`, so
/// the sentinel cannot be mistaken for an entry.
///
/// Lookup is a linear scan. With at most a few dozen entries a scan over one
/// contiguous array is cheaper than hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIndex<const N: usize> {
    names: [String; N],
    len: usize,
}

impl<const N: usize> NameIndex<N> {
    /// Build an index from names that are already sorted and unique.
    ///
    /// Names beyond the capacity `N` are dropped; callers validate the
    /// policy first so this never happens on the build path.
    fn from_sorted<'a, I>(sorted: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: [String; N] = std::array::from_fn(|_| String::new());
        let mut len = 0;
        for name in sorted.into_iter().take(N) {
            names[len] = name.to_string();
            len += 1;
        }
        Self { names, len }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no names are indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity of the index.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Position of `name`, by exact match.
    pub fn position(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.names[..self.len].iter().position(|n| n == name)
    }

    /// Name stored at `index`, if that slot is occupied.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names[..self.len].get(index).map(String::as_str)
    }

    /// Occupied names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names[..self.len].iter().map(String::as_str)
    }

    /// Every slot including the trailing sentinels.
    pub fn slots(&self) -> &[String; N] {
        &self.names
    }
}

impl RoleIndex {
    /// Index the policy's role names in ascending order.
    pub fn assign_roles(policy: &Policy) -> Self {
        let mut names: Vec<&str> = policy.roles.iter().map(|role| role.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        Self::from_sorted(names)
    }
}

impl ResourceIndex {
    /// Index the policy's unique, non-empty resource names in ascending order.
    pub fn assign_resources(policy: &Policy) -> Self {
        Self::from_sorted(policy.unique_resources())
    }
}

/// Assign both indexes for a validated policy.
pub fn assign(policy: &Policy) -> (RoleIndex, ResourceIndex) {
    (
        RoleIndex::assign_roles(policy),
        ResourceIndex::assign_resources(policy),
    )
}
