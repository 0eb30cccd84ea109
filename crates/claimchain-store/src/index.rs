//! Reverse claim ownership and the fingerprint-to-certificate table.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use claimchain_core::reference::is_alternate_encoding;
use claimchain_core::{Certificate, ClaimId, IdentityKey};

/// Claim-id to owner map plus certificate side table.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    /// Claim id -> owning identity. Written once per claim.
    owners: RwLock<HashMap<ClaimId, IdentityKey>>,
    /// Fingerprint -> certificate.
    certificates: RwLock<HashMap<IdentityKey, Certificate>>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the owner of a newly admitted claim.
    ///
    /// An existing entry is never overwritten; returns `false` in that case.
    pub fn record_owner(&self, claim_id: ClaimId, owner: IdentityKey) -> bool {
        let mut owners = self.owners.write();
        if owners.contains_key(&claim_id) {
            return false;
        }
        owners.insert(claim_id, owner);
        true
    }

    /// The identity owning `claim_id`.
    pub fn owner_of(&self, claim_id: &ClaimId) -> Option<IdentityKey> {
        self.owners.read().get(claim_id).cloned()
    }

    /// Remove every owner entry pointing at `owner`. Returns how many.
    pub fn remove_owned_by(&self, owner: &IdentityKey) -> usize {
        let mut owners = self.owners.write();
        let before = owners.len();
        owners.retain(|claim_id, key| {
            if key == owner {
                debug!(claim_id = %claim_id, "removing claim owner entry");
                false
            } else {
                true
            }
        });
        before - owners.len()
    }

    /// Store a certificate under a reference.
    pub fn store_certificate(&self, reference: IdentityKey, certificate: Certificate) {
        self.certificates.write().insert(reference, certificate);
    }

    /// Resolve a fingerprint to its certificate.
    ///
    /// A reference already in the alternate encoding is its own certificate.
    /// An unknown fingerprint resolves to `None`.
    pub fn certificate_for(&self, fingerprint: &IdentityKey) -> Option<Certificate> {
        if is_alternate_encoding(fingerprint.as_str()) {
            return Some(Certificate::new(fingerprint.as_str()));
        }
        self.certificates.read().get(fingerprint).cloned()
    }

    /// Drop the certificate stored under `fingerprint`.
    pub fn remove_certificate(&self, fingerprint: &IdentityKey) -> Option<Certificate> {
        self.certificates.write().remove(fingerprint)
    }

    /// Number of claims with a recorded owner.
    pub fn owned_claims(&self) -> usize {
        self.owners.read().len()
    }
}
