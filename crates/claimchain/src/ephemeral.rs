//! The ephemeral store: admission, reads, subscriptions and deletion.
//!
//! Every operation that checks a signature does so before entering an
//! identity's exclusive section. Admission then performs duplicate check,
//! append, owner indexing, ACL attachment and fan-out as one section.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use claimchain_core::{
    canonical_bytes, AccessDirective, AccessorProof, Certificate, ClaimId, ClaimView,
    IdentityKey, IdentityVerifier, SignedClaim,
};
use claimchain_perms::{apply_directive, evaluate, resolve_target, AclChange, AclTarget};
use claimchain_store::{
    ClaimChainStore, ClaimStream, IdentityIndex, IdentityRecord, InsertResult,
};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::hub::NotificationHub;

/// Message an accessor signs to subscribe to every identity.
pub const GLOBAL_SUBSCRIPTION_TOKEN: &str = "null";

/// Result of submitting a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitResult {
    /// Claim was appended and listeners were notified.
    Admitted(ClaimId),
    /// Claim was already stored (idempotent, no notification).
    Duplicate(ClaimId),
    /// Signature did not verify, or another identity owns the claim id;
    /// nothing was stored.
    Rejected,
}

impl AdmitResult {
    /// The claim id, unless the claim was rejected.
    pub fn claim_id(&self) -> Option<&ClaimId> {
        match self {
            AdmitResult::Admitted(id) | AdmitResult::Duplicate(id) => Some(id),
            AdmitResult::Rejected => None,
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmitResult::Admitted(_))
    }
}

/// Resolves once a subscription's listener is registered.
#[derive(Debug)]
pub struct Registered(oneshot::Receiver<()>);

impl Future for Registered {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.0).poll(cx).map(|_| ())
    }
}

/// A live subscription.
#[derive(Debug)]
pub struct Subscription {
    /// Events for claims the subscriber may read.
    pub stream: ClaimStream,
    /// Registration acknowledgement. Claims admitted after this resolves are
    /// never missed.
    pub registered: Registered,
}

impl Subscription {
    pub fn into_parts(self) -> (ClaimStream, Registered) {
        (self.stream, self.registered)
    }
}

/// In-memory claim store with per-identity chains, ACLs and notification.
///
/// Share it between tasks behind an `Arc`.
pub struct EphemeralStore<V: IdentityVerifier> {
    verifier: V,
    chains: ClaimChainStore,
    index: IdentityIndex,
    hub: NotificationHub,
    config: StoreConfig,
}

impl<V: IdentityVerifier> EphemeralStore<V> {
    /// Create a store using `verifier` to check signatures.
    pub fn new(verifier: V, config: StoreConfig) -> Self {
        Self {
            verifier,
            chains: ClaimChainStore::new(),
            index: IdentityIndex::new(),
            hub: NotificationHub::new(config.subscriber_buffer),
            config,
        }
    }

    /// Create a store with the default configuration.
    pub fn with_defaults(verifier: V) -> Self {
        Self::new(verifier, StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admission
    // ─────────────────────────────────────────────────────────────────────────

    /// Admit a signed claim.
    ///
    /// An invalid signature is not an error: the claim is logged and
    /// reported as [`AdmitResult::Rejected`]. Re-submitting a stored claim
    /// returns [`AdmitResult::Duplicate`] without notifying anyone. A claim
    /// id already owned by a different identity is rejected.
    pub async fn claim(&self, claim: SignedClaim) -> AdmitResult {
        let message = canonical_bytes(&claim.message);
        if !self
            .verifier
            .verify(&message, &claim.signature, &claim.public_key)
            .await
        {
            warn!(identity = %claim.public_key, "invalid signature on claim");
            return AdmitResult::Rejected;
        }

        let claim_id = claim.claim_id();
        let (data, directive) = claim.submission(self.config.payload_directives).into_parts();
        let SignedClaim {
            signature,
            public_key,
            ..
        } = claim;

        self.chains.exclusive(&public_key, |record| {
            if record.contains(&claim_id) {
                info!(identity = %public_key, claim_id = %claim_id, "claim already existed");
                return AdmitResult::Duplicate(claim_id);
            }

            // The owner entry is taken first: a claim id belongs to one identity.
            if !self.index.record_owner(claim_id.clone(), public_key.clone()) {
                warn!(
                    identity = %public_key,
                    claim_id = %claim_id,
                    owner = ?self.index.owner_of(&claim_id),
                    "claim id already owned by another identity"
                );
                return AdmitResult::Rejected;
            }

            if let InsertResult::AlreadyExists = record.append(data, signature) {
                return AdmitResult::Duplicate(claim_id);
            }

            if let Some(directive) = directive {
                self.attach_access(record, &directive);
            }

            let delivered = self.hub.fan_out(record, &claim_id);
            debug!(identity = %public_key, claim_id = %claim_id, delivered, "claim admitted");

            AdmitResult::Admitted(claim_id)
        })
    }

    /// Apply an access directive inside the owner's exclusive section.
    fn attach_access(&self, record: &mut IdentityRecord, directive: &AccessDirective) {
        let target = resolve_target(directive, |id| record.contains(id));

        let acl = match &target {
            AclTarget::Identity => Some(record.access_mut()),
            AclTarget::Claim(id) => record.claim_access_mut(id),
        };
        let Some(acl) = acl else {
            return;
        };

        match apply_directive(directive, acl) {
            AclChange::MadePublic => {
                debug!(identity = %record.key(), target = ?target, "access made public");
            }
            AclChange::Allowed(accessor) => {
                debug!(identity = %record.key(), target = ?target, accessor = %accessor, "access granted");
            }
            AclChange::Unchanged => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a claim.
    ///
    /// With an accessor proof, the proof must be a signature by the accessor
    /// over the claim id, or the call fails with
    /// [`StoreError::AuthenticationFailed`]. Without one the caller is
    /// anonymous. A claim the caller may not read is reported as `None`,
    /// same as an unknown one.
    pub async fn get(
        &self,
        claim_id: &ClaimId,
        accessor: Option<&AccessorProof>,
    ) -> Result<Option<ClaimView>> {
        if let Some(proof) = accessor {
            self.authenticate(proof, claim_id.as_str().as_bytes()).await?;
        }
        let accessor_key = accessor.map(|proof| &proof.key);

        let Some(owner) = self.index.owner_of(claim_id) else {
            return Ok(None);
        };

        let lookup = self
            .chains
            .read(&owner, |record| {
                record.get(claim_id).map(|stored| {
                    let decision =
                        evaluate(&owner, record.access(), &stored.access, accessor_key);
                    (stored.view.clone(), decision)
                })
            })
            .flatten();

        match lookup {
            Some((view, decision)) if decision.is_granted() => Ok(Some(view)),
            Some(_) => {
                warn!(
                    accessor = ?accessor_key,
                    claim_id = %claim_id,
                    "access to claim denied"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Whether `accessor` may read `claim_id`. Unknown claims are never readable.
    pub fn can_access(&self, claim_id: &ClaimId, accessor: Option<&IdentityKey>) -> bool {
        let Some(owner) = self.index.owner_of(claim_id) else {
            return false;
        };
        self.chains
            .read(&owner, |record| {
                record.get(claim_id).map_or(false, |stored| {
                    evaluate(&owner, record.access(), &stored.access, accessor).is_granted()
                })
            })
            .unwrap_or(false)
    }

    /// The head of an identity's chain.
    pub fn get_latest(&self, identity: &IdentityKey) -> Option<ClaimId> {
        self.chains
            .read(identity, |record| record.last().cloned())
            .flatten()
    }

    /// The identity owning a claim. Ownership is not claim content, so no
    /// access check applies.
    pub fn get_owner(&self, claim_id: &ClaimId) -> Option<IdentityKey> {
        self.index.owner_of(claim_id)
    }

    /// Claim ids of an identity, newest first.
    pub fn chain(&self, identity: &IdentityKey) -> Vec<ClaimId> {
        self.chains
            .read(identity, |record| record.chain())
            .unwrap_or_default()
    }

    /// Number of claims stored for an identity.
    pub fn claim_count(&self, identity: &IdentityKey) -> usize {
        self.chains
            .read(identity, |record| record.claim_count())
            .unwrap_or(0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certificates
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a certificate under a reference.
    pub fn store_certificate(&self, reference: IdentityKey, certificate: Certificate) {
        self.index.store_certificate(reference, certificate);
    }

    /// Resolve a fingerprint to its certificate.
    pub fn resolve_certificate(&self, fingerprint: &IdentityKey) -> Option<Certificate> {
        self.index.certificate_for(fingerprint)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscriptions
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscribe to newly admitted claims.
    ///
    /// With `identity`, only that identity's claims are delivered; without,
    /// every identity's. An accessor proof is a signature over the identity
    /// key, or over [`GLOBAL_SUBSCRIPTION_TOKEN`] for a global subscription.
    /// Each event is filtered by the accessor's read access; an anonymous
    /// subscriber only hears public claims.
    pub async fn subscribe(
        &self,
        identity: Option<&IdentityKey>,
        accessor: Option<&AccessorProof>,
    ) -> Result<Subscription> {
        if let Some(proof) = accessor {
            let message = identity.map_or(GLOBAL_SUBSCRIPTION_TOKEN, |key| key.as_str());
            self.authenticate(proof, message.as_bytes()).await?;
        }
        let owner = accessor.map(|proof| proof.key.clone());

        let stream = match identity {
            Some(key) => {
                let (listener, stream) = self.hub.listener(owner);
                self.chains
                    .exclusive(key, |record| record.add_observer(listener));
                stream
            }
            None => self.hub.register_global(owner),
        };

        // Registration above completed synchronously, so the ack resolves
        // immediately. The receiver is still held here, so `send` cannot fail.
        let (ack, registered) = oneshot::channel();
        let _ = ack.send(());

        Ok(Subscription {
            stream,
            registered: Registered(registered),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────────

    /// Purge an identity: its claims, chain head, ACL, scoped listeners,
    /// owner entries, certificate and the global listeners it registered.
    ///
    /// Listeners this identity registered on other identities are left in
    /// place; they go away with those identities, or when their stream is
    /// dropped.
    pub fn delete_identity(&self, fingerprint: &IdentityKey) {
        info!(identity = %fingerprint, "deleting identity");

        let removed = self
            .chains
            .delete(fingerprint, |_| self.index.remove_owned_by(fingerprint));
        let certificate = self.index.remove_certificate(fingerprint);
        let listeners = self.hub.remove_global_owned_by(fingerprint);

        debug!(
            identity = %fingerprint,
            claims = removed.unwrap_or(0),
            certificate = certificate.is_some(),
            global_listeners = listeners,
            "identity deleted"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    async fn authenticate(&self, proof: &AccessorProof, message: &[u8]) -> Result<()> {
        if self
            .verifier
            .verify(message, &proof.signature, &proof.key)
            .await
        {
            Ok(())
        } else {
            warn!(accessor = %proof.key, "accessor signature did not verify");
            Err(StoreError::AuthenticationFailed {
                accessor: proof.key.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimchain_core::Signature;
    use serde_json::json;
    use stub::AlwaysValid;

    /// Accepts any signature not starting with `bad`.
    mod stub {
        use async_trait::async_trait;
        use claimchain_core::{IdentityHandle, IdentityKey, IdentityVerifier, Signature};

        pub struct AlwaysValid;

        struct Handle(IdentityKey);

        impl IdentityHandle for Handle {
            fn key(&self) -> &IdentityKey {
                &self.0
            }

            fn verify(&self, _message: &[u8], signature: &Signature) -> bool {
                !signature.as_str().starts_with("bad")
            }
        }

        #[async_trait]
        impl IdentityVerifier for AlwaysValid {
            async fn resolve(
                &self,
                reference: &IdentityKey,
            ) -> claimchain_core::Result<Box<dyn IdentityHandle>> {
                Ok(Box::new(Handle(reference.clone())))
            }
        }
    }

    fn signed(owner: &str, sig: &str, message: serde_json::Value) -> SignedClaim {
        SignedClaim {
            message,
            signature: Signature::new(sig),
            public_key: IdentityKey::new(owner),
            access: None,
        }
    }

    fn store() -> EphemeralStore<AlwaysValid> {
        EphemeralStore::with_defaults(AlwaysValid)
    }

    #[tokio::test]
    async fn test_rejected_claim_stores_nothing() {
        let store = store();
        let result = store.claim(signed("p", "bad-1", json!({}))).await;
        assert_eq!(result, AdmitResult::Rejected);
        assert_eq!(result.claim_id(), None);
        assert_eq!(store.get_latest(&IdentityKey::new("p")), None);
    }

    #[tokio::test]
    async fn test_scope_to_foreign_claim_is_ignored() {
        let store = store();
        let q_claim = store
            .claim(signed("q", "q1", json!({"need": "tea"})))
            .await
            .claim_id()
            .cloned()
            .unwrap();

        let mut hijack = signed("p", "p1", json!({}));
        hijack.access = Some(AccessDirective::public().scoped_to(&q_claim));
        store.claim(hijack).await;

        // The directive fell back to P's identity-wide ACL.
        assert!(!store.can_access(&q_claim, None));
        assert!(store.can_access(&ClaimId::new("p1"), None));
    }

    #[tokio::test]
    async fn test_scoped_public_opens_only_that_claim() {
        let store = store();
        let first = ClaimId::new("p1");
        store.claim(signed("p", "p1", json!({"n": 1}))).await;
        store.claim(signed("p", "p2", json!({"n": 2}))).await;

        let mut opener = signed("p", "p3", json!({}));
        opener.access = Some(AccessDirective::public().scoped_to(&first));
        store.claim(opener).await;

        assert!(store.can_access(&first, None));
        assert!(!store.can_access(&ClaimId::new("p2"), None));
        assert!(!store.can_access(&ClaimId::new("p3"), None));
    }

    #[tokio::test]
    async fn test_bad_accessor_proof_is_an_error() {
        let store = store();
        store.claim(signed("p", "p1", json!({}))).await;

        let proof = AccessorProof::new(IdentityKey::new("p"), Signature::new("bad-proof"));
        let result = store.get(&ClaimId::new("p1"), Some(&proof)).await;
        assert!(matches!(
            result,
            Err(StoreError::AuthenticationFailed { accessor }) if accessor == IdentityKey::new("p")
        ));

        assert!(store.subscribe(None, Some(&proof)).await.is_err());
    }

    #[tokio::test]
    async fn test_subscription_is_registered_before_returning() {
        let store = store();
        let subscription = store.subscribe(Some(&IdentityKey::new("p")), None).await.unwrap();
        let (mut stream, registered) = subscription.into_parts();
        registered.await;

        let mut open = signed("p", "p1", json!({"need": "beer"}));
        open.access = Some(AccessDirective::public());
        store.claim(open).await;

        let event = stream.try_recv().unwrap();
        assert_eq!(event.claim.signature, Signature::new("p1"));
    }

    #[tokio::test]
    async fn test_claim_id_owned_elsewhere_is_rejected() {
        let store = store();
        let mut subscription = store.subscribe(None, None).await.unwrap();

        let mut first = signed("p", "same", json!({"n": 1}));
        first.access = Some(AccessDirective::public());
        let mut second = signed("q", "same", json!({"n": 2}));
        second.access = Some(AccessDirective::public());

        assert_eq!(store.claim(first).await, AdmitResult::Admitted(ClaimId::new("same")));
        assert_eq!(store.claim(second).await, AdmitResult::Rejected);

        let q = IdentityKey::new("q");
        assert_eq!(store.get_owner(&ClaimId::new("same")), Some(IdentityKey::new("p")));
        assert_eq!(store.claim_count(&q), 0);
        assert_eq!(store.get_latest(&q), None);

        // Only P's admission was announced.
        let event = subscription.stream.try_recv().unwrap();
        assert_eq!(event.identity, IdentityKey::new("p"));
        assert!(subscription.stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_claim_id_is_free_again_after_owner_deletion() {
        let store = store();
        store.claim(signed("p", "same", json!({}))).await;
        store.delete_identity(&IdentityKey::new("p"));

        let result = store.claim(signed("q", "same", json!({}))).await;
        assert_eq!(result, AdmitResult::Admitted(ClaimId::new("same")));
        assert_eq!(store.get_owner(&ClaimId::new("same")), Some(IdentityKey::new("q")));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = store();
        store.claim(signed("p", "p1", json!({}))).await;
        store.delete_identity(&IdentityKey::new("p"));
        store.delete_identity(&IdentityKey::new("p"));
        assert_eq!(store.get_owner(&ClaimId::new("p1")), None);
        assert_eq!(store.claim_count(&IdentityKey::new("p")), 0);
    }
}
