//! Access evaluation and directive application.
//!
//! The same [`evaluate`] is used for direct reads and for filtering
//! notifications, so both paths always agree.

use claimchain_core::{AccessDirective, ClaimId, DirectiveGrant, IdentityKey};

use crate::access::AccessList;

/// Where a directive's ACL change lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclTarget {
    /// The owner's identity-wide list.
    Identity,
    /// The list of one claim owned by the same identity.
    Claim(ClaimId),
}

/// The outcome of applying a directive to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclChange {
    /// The list became public.
    MadePublic,
    /// The accessor was added.
    Allowed(IdentityKey),
    /// Nothing changed (already public, already listed, or unusable accessor).
    Unchanged,
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The accessor owns the claim.
    Owner,
    /// A public list granted access.
    Public,
    /// An allow-set names the accessor.
    Allowed,
    /// No rule grants access.
    Denied,
}

impl Decision {
    pub fn is_granted(self) -> bool {
        !matches!(self, Decision::Denied)
    }
}

/// Pick the list a directive applies to.
///
/// A scope only retargets when it links to a claim the submitting identity
/// owns (`owns` answers that). Anything else keeps the identity-wide list.
pub fn resolve_target(directive: &AccessDirective, owns: impl Fn(&ClaimId) -> bool) -> AclTarget {
    match directive.scope_claim() {
        Some(claim_id) if owns(&claim_id) => AclTarget::Claim(claim_id),
        _ => AclTarget::Identity,
    }
}

/// Apply a directive to the chosen list.
pub fn apply_directive(directive: &AccessDirective, acl: &mut AccessList) -> AclChange {
    match directive.grant_kind() {
        DirectiveGrant::Public => {
            if acl.is_public() {
                AclChange::Unchanged
            } else {
                acl.make_public();
                AclChange::MadePublic
            }
        }
        DirectiveGrant::Identity(key) => {
            if acl.allow(key.clone()) {
                AclChange::Allowed(key)
            } else {
                AclChange::Unchanged
            }
        }
        DirectiveGrant::Unrecognized => AclChange::Unchanged,
    }
}

/// Decide whether `accessor` may read a claim owned by `owner`.
pub fn evaluate(
    owner: &IdentityKey,
    identity_acl: &AccessList,
    claim_acl: &AccessList,
    accessor: Option<&IdentityKey>,
) -> Decision {
    if accessor == Some(owner) {
        return Decision::Owner;
    }

    for acl in [identity_acl, claim_acl] {
        if acl.is_public() {
            return Decision::Public;
        }
        if acl.permits(accessor) {
            return Decision::Allowed;
        }
    }

    Decision::Denied
}
