//! # Claimchain Permissions
//!
//! Access control for claims.
//!
//! ## Overview
//!
//! Every identity carries an identity-wide [`AccessList`] and every claim
//! carries one of its own. Both start private. Access directives attached
//! to claims at admission time open them up, either to everyone or to one
//! accessor at a time.
//!
//! ## Evaluation
//!
//! An accessor may read a claim when it is the claim's owner, or when
//! either the owner's identity-wide list or the claim's own list is public
//! or names the accessor. See [`evaluate`].
//!
//! ## Usage
//!
//! ```rust
//! use claimchain_core::{AccessDirective, IdentityKey};
//! use claimchain_perms::{apply_directive, evaluate, AccessList, AclTarget, resolve_target};
//!
//! let owner = IdentityKey::new("owner");
//! let friend = IdentityKey::new("friend");
//!
//! let mut identity_acl = AccessList::default();
//! let directive = AccessDirective::grant(&friend);
//! assert_eq!(resolve_target(&directive, |_| false), AclTarget::Identity);
//! apply_directive(&directive, &mut identity_acl);
//!
//! let claim_acl = AccessList::default();
//! assert!(evaluate(&owner, &identity_acl, &claim_acl, Some(&friend)).is_granted());
//! ```

pub mod access;
pub mod policy;

pub use access::AccessList;
pub use policy::{apply_directive, evaluate, resolve_target, AclChange, AclTarget, Decision};
