//! Reference encodings for claims and identities.
//!
//! Access directives point at claims and identities through prefixed text
//! references: `link:claimchain:<claim-id>` for a claim and
//! `did:claimchain:<identity-key>` for an identity. Keys that start with
//! [`ALTERNATE_ENCODING_PREFIX`] are already in certificate form.

use crate::types::{ClaimId, IdentityKey};

/// Prefix of a claim link.
pub const LINK_PREFIX: &str = "link:claimchain:";

/// Prefix of an identity reference.
pub const IDENTITY_PREFIX: &str = "did:claimchain:";

/// Prefix of a key that is already in its alternate (certificate) encoding.
pub const ALTERNATE_ENCODING_PREFIX: &str = "ec:";

/// Extract the claim id from a claim link.
pub fn claim_from_link(s: &str) -> Option<ClaimId> {
    s.strip_prefix(LINK_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(ClaimId::new)
}

/// Build the link for a claim.
pub fn link_for(claim_id: &ClaimId) -> String {
    format!("{}{}", LINK_PREFIX, claim_id.as_str())
}

/// Extract the identity key from an identity reference.
pub fn identity_from_reference(s: &str) -> Option<IdentityKey> {
    s.strip_prefix(IDENTITY_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(IdentityKey::new)
}

/// Build the reference for an identity.
pub fn identity_reference(key: &IdentityKey) -> String {
    format!("{}{}", IDENTITY_PREFIX, key.as_str())
}

/// Whether `s` is already in the alternate (certificate) encoding.
pub fn is_alternate_encoding(s: &str) -> bool {
    s.starts_with(ALTERNATE_ENCODING_PREFIX)
}
