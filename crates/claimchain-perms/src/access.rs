//! Access-control lists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use claimchain_core::IdentityKey;

/// Who may read: everyone, or an explicit set of accessors.
///
/// The default is an empty allow-set, i.e. private to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessList {
    /// Anyone may read.
    Public,
    /// Only the listed accessors may read.
    Allow(BTreeSet<IdentityKey>),
}

impl Default for AccessList {
    fn default() -> Self {
        AccessList::Allow(BTreeSet::new())
    }
}

impl AccessList {
    /// Whether this list grants everyone.
    pub fn is_public(&self) -> bool {
        matches!(self, AccessList::Public)
    }

    /// Whether this list grants nobody besides the owner.
    pub fn is_private(&self) -> bool {
        matches!(self, AccessList::Allow(set) if set.is_empty())
    }

    /// Whether `accessor` may read under this list.
    ///
    /// An anonymous accessor (`None`) is only granted by a public list.
    pub fn permits(&self, accessor: Option<&IdentityKey>) -> bool {
        match self {
            AccessList::Public => true,
            AccessList::Allow(set) => accessor.map_or(false, |key| set.contains(key)),
        }
    }

    /// Open this list to everyone. Irreversible.
    pub fn make_public(&mut self) {
        *self = AccessList::Public;
    }

    /// Add `accessor` to the allow-set.
    ///
    /// Returns `false` when nothing changed: the list is already public or
    /// already names the accessor.
    pub fn allow(&mut self, accessor: IdentityKey) -> bool {
        match self {
            AccessList::Public => false,
            AccessList::Allow(set) => set.insert(accessor),
        }
    }

    /// The explicitly allowed accessors (empty when public).
    pub fn allowed(&self) -> impl Iterator<Item = &IdentityKey> {
        let set = match self {
            AccessList::Public => None,
            AccessList::Allow(set) => Some(set),
        };
        set.into_iter().flatten()
    }
}
