//! Identity records: one identity's hash-linked chain of claims.

use std::collections::HashMap;

use claimchain_core::{ClaimId, ClaimView, IdentityKey, Signature};
use claimchain_perms::AccessList;

use crate::listener::Listener;

/// Result of appending a claim to a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Claim was appended; `previous` is the claim it links back to.
    Inserted { previous: Option<ClaimId> },
    /// A claim with this id already exists (idempotent - not an error).
    AlreadyExists,
}

/// A claim as held by the store, with its own ACL.
#[derive(Debug, Clone)]
pub struct StoredClaim {
    pub view: ClaimView,
    pub access: AccessList,
}

/// Everything the store knows about one identity.
#[derive(Debug)]
pub struct IdentityRecord {
    key: IdentityKey,
    /// Claims indexed by id.
    claims: HashMap<ClaimId, StoredClaim>,
    /// Head of the chain.
    last: Option<ClaimId>,
    /// Listeners scoped to this identity.
    observers: Vec<Listener>,
    /// Identity-wide ACL.
    access: AccessList,
    /// Set once the identity is deleted; a retired record accepts no writes.
    retired: bool,
}

impl IdentityRecord {
    /// Create an empty record. Starts private, with no claims.
    pub fn new(key: IdentityKey) -> Self {
        Self {
            key,
            claims: HashMap::new(),
            last: None,
            observers: Vec::new(),
            access: AccessList::default(),
            retired: false,
        }
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// The most recently appended claim.
    pub fn last(&self) -> Option<&ClaimId> {
        self.last.as_ref()
    }

    pub fn contains(&self, claim_id: &ClaimId) -> bool {
        self.claims.contains_key(claim_id)
    }

    pub fn get(&self, claim_id: &ClaimId) -> Option<&StoredClaim> {
        self.claims.get(claim_id)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Append a claim at the head of the chain.
    ///
    /// The claim id is the signature. An id already present leaves the
    /// record untouched.
    pub fn append(&mut self, data: serde_json::Value, signature: Signature) -> InsertResult {
        let claim_id = ClaimId::from(&signature);
        if self.claims.contains_key(&claim_id) {
            return InsertResult::AlreadyExists;
        }

        let previous = self.last.replace(claim_id.clone());
        self.claims.insert(
            claim_id,
            StoredClaim {
                view: ClaimView {
                    data,
                    signature,
                    previous: previous.clone(),
                },
                access: AccessList::default(),
            },
        );

        InsertResult::Inserted { previous }
    }

    /// Claim ids from the head of the chain back to the first claim.
    pub fn chain(&self) -> Vec<ClaimId> {
        let mut ids = Vec::with_capacity(self.claims.len());
        let mut cursor = self.last.as_ref();

        while let Some(id) = cursor {
            // A chain never has more links than claims.
            if ids.len() == self.claims.len() {
                break;
            }
            ids.push(id.clone());
            cursor = self.claims.get(id).and_then(|c| c.view.previous.as_ref());
        }

        ids
    }

    /// Identity-wide ACL.
    pub fn access(&self) -> &AccessList {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessList {
        &mut self.access
    }

    /// ACL of one claim in this record.
    pub fn claim_access_mut(&mut self, claim_id: &ClaimId) -> Option<&mut AccessList> {
        self.claims.get_mut(claim_id).map(|c| &mut c.access)
    }

    pub fn observers(&self) -> &[Listener] {
        &self.observers
    }

    pub fn add_observer(&mut self, listener: Listener) {
        self.observers.push(listener);
    }

    /// Drop listeners whose stream is gone. Returns how many were removed.
    pub fn prune_closed_observers(&mut self) -> usize {
        let before = self.observers.len();
        self.observers.retain(|l| !l.is_closed());
        before - self.observers.len()
    }

    /// Mark this record as deleted. Its observers are released.
    pub fn retire(&mut self) {
        self.retired = true;
        self.observers.clear();
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sig(n: u64) -> Signature {
        Signature::new(format!("{:016x}", n))
    }

    #[test]
    fn test_first_claim_has_no_previous() {
        let mut record = IdentityRecord::new(IdentityKey::new("p"));
        let result = record.append(json!({"need": "beer"}), sig(1));

        assert_eq!(result, InsertResult::Inserted { previous: None });
        assert_eq!(record.last(), Some(&ClaimId::from(&sig(1))));
        assert!(record.access().is_private());
    }

    #[test]
    fn test_second_claim_links_to_first() {
        let mut record = IdentityRecord::new(IdentityKey::new("p"));
        record.append(json!({"need": "beer"}), sig(1));
        let result = record.append(json!({"need": "wine"}), sig(2));

        let first = ClaimId::from(&sig(1));
        assert_eq!(
            result,
            InsertResult::Inserted {
                previous: Some(first.clone())
            }
        );
        let second = record.get(&ClaimId::from(&sig(2))).unwrap();
        assert_eq!(second.view.previous, Some(first));
    }

    #[test]
    fn test_duplicate_is_no_op() {
        let mut record = IdentityRecord::new(IdentityKey::new("p"));
        record.append(json!({"need": "beer"}), sig(1));
        record.append(json!({"need": "wine"}), sig(2));

        assert_eq!(
            record.append(json!({"need": "beer"}), sig(1)),
            InsertResult::AlreadyExists
        );
        assert_eq!(record.claim_count(), 2);
        assert_eq!(record.last(), Some(&ClaimId::from(&sig(2))));
    }

    #[test]
    fn test_prune_closed_observers() {
        let mut record = IdentityRecord::new(IdentityKey::new("p"));
        let (kept, _kept_stream) = Listener::channel(None, 1);
        let (gone, gone_stream) = Listener::channel(None, 1);
        record.add_observer(kept);
        record.add_observer(gone);

        drop(gone_stream);
        assert_eq!(record.prune_closed_observers(), 1);
        assert_eq!(record.observers().len(), 1);
    }

    #[test]
    fn test_retire_releases_observers() {
        let mut record = IdentityRecord::new(IdentityKey::new("p"));
        let (listener, _stream) = Listener::channel(None, 1);
        record.add_observer(listener);

        record.retire();
        assert!(record.is_retired());
        assert!(record.observers().is_empty());
    }

    proptest! {
        #[test]
        fn test_chain_reconstructs_admission_order(count in 0usize..40) {
            let mut record = IdentityRecord::new(IdentityKey::new("p"));
            let mut admitted = Vec::new();
            for n in 0..count {
                let signature = sig(n as u64);
                admitted.push(ClaimId::from(&signature));
                record.append(json!({ "n": n }), signature);
            }

            let mut chain = record.chain();
            chain.reverse();
            prop_assert_eq!(chain, admitted);
        }
    }
}
