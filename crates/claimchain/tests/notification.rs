//! Subscriptions, fan-out filtering and identity deletion.

use std::time::Duration;

use claimchain::core::Ed25519Verifier;
use claimchain::{
    AccessDirective, AdmitResult, ClaimId, EphemeralStore, NotificationEvent, StoreConfig,
    Subscription,
};
use claimchain_testkit::{multi_party, Party};
use serde_json::json;
use tokio_stream::StreamExt;

fn new_store() -> EphemeralStore<Ed25519Verifier> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    EphemeralStore::with_defaults(Ed25519Verifier::new())
}

async fn admit(store: &EphemeralStore<Ed25519Verifier>, claim: claimchain::SignedClaim) -> ClaimId {
    match store.claim(claim).await {
        AdmitResult::Admitted(id) => id,
        other => panic!("expected admission, got {:?}", other),
    }
}

async fn subscribe_as(
    store: &EphemeralStore<Ed25519Verifier>,
    subscriber: &Party,
    identity: Option<&Party>,
) -> Subscription {
    let key = identity.map(Party::key);
    let proof = subscriber.prove_subscribe(key.as_ref());
    store.subscribe(key.as_ref(), Some(&proof)).await.unwrap()
}

#[tokio::test]
async fn test_global_subscriber_receives_public_claim() {
    let store = new_store();
    let p = Party::new();

    let Subscription { mut stream, registered } = store.subscribe(None, None).await.unwrap();
    registered.await;

    let id = admit(
        &store,
        p.sign_claim_with(json!({"need": "beer"}), AccessDirective::public()),
    )
    .await;

    let event: NotificationEvent = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.identity, p.key());
    assert_eq!(event.claim.data, json!({"need": "beer"}));
    assert_eq!(event.claim.signature, id.to_signature());
    assert!(stream.try_recv().is_none());
}

#[tokio::test]
async fn test_scoped_subscriber_hears_only_its_identity() {
    let store = new_store();
    let parties = multi_party(3);
    let (a, b, watcher) = (&parties[0], &parties[1], &parties[2]);

    let mut on_a = subscribe_as(&store, watcher, Some(a)).await;

    admit(&store, b.sign_claim_with(json!({"from": "b"}), AccessDirective::public())).await;
    admit(&store, a.sign_claim_with(json!({"from": "a"}), AccessDirective::public())).await;

    let event = on_a.stream.recv().await.unwrap();
    assert_eq!(event.identity, a.key());
    assert_eq!(event.claim.data, json!({"from": "a"}));
    assert!(on_a.stream.try_recv().is_none());
}

#[tokio::test]
async fn test_subscriber_only_hears_readable_claims() {
    let store = new_store();
    let parties = multi_party(3);
    let (p, q, r) = (&parties[0], &parties[1], &parties[2]);

    let mut as_owner = subscribe_as(&store, p, None).await;
    let mut as_q = subscribe_as(&store, q, Some(p)).await;
    let mut as_r = subscribe_as(&store, r, None).await;
    let mut anonymous = store.subscribe(None, None).await.unwrap();

    admit(&store, p.sign_claim(json!({"n": 1}))).await;
    admit(&store, p.sign_claim_with(json!({"n": 2}), AccessDirective::grant(&q.key()))).await;

    // The owner hears everything.
    assert_eq!(as_owner.stream.try_recv().unwrap().claim.data, json!({"n": 1}));
    assert_eq!(as_owner.stream.try_recv().unwrap().claim.data, json!({"n": 2}));

    // The grant is attached before fan-out, so Q hears the granting claim.
    assert_eq!(as_q.stream.try_recv().unwrap().claim.data, json!({"n": 2}));
    assert!(as_q.stream.try_recv().is_none());

    assert!(as_r.stream.try_recv().is_none());
    assert!(anonymous.stream.try_recv().is_none());
}

#[tokio::test]
async fn test_subscribe_before_identity_exists() {
    let store = new_store();
    let p = Party::new();

    let mut subscription = store.subscribe(Some(&p.key()), None).await.unwrap();
    assert!(store.chain(&p.key()).is_empty());

    admit(&store, p.sign_claim_with(json!({"first": true}), AccessDirective::public())).await;
    assert!(subscription.stream.try_recv().is_some());
}

#[tokio::test]
async fn test_forged_subscription_proof_fails() {
    let store = new_store();
    let parties = multi_party(2);
    let (p, q) = (&parties[0], &parties[1]);

    // Signed for a global subscription, presented for a scoped one.
    let proof = q.prove_subscribe(None);
    assert!(store.subscribe(Some(&p.key()), Some(&proof)).await.is_err());

    let proof = q.prove_subscribe(Some(&p.key()));
    assert!(store.subscribe(None, Some(&proof)).await.is_err());
}

#[tokio::test]
async fn test_full_buffer_drops_without_blocking() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = StoreConfig {
        subscriber_buffer: 2,
        ..StoreConfig::default()
    };
    let store = EphemeralStore::new(Ed25519Verifier::new(), config);
    let p = Party::new();

    let mut slow = store.subscribe(None, None).await.unwrap();
    for n in 0..5 {
        let result = store
            .claim(p.sign_claim_with(json!({ "n": n }), AccessDirective::public()))
            .await;
        assert!(result.is_admitted());
    }

    assert_eq!(slow.stream.try_recv().unwrap().claim.data, json!({"n": 0}));
    assert_eq!(slow.stream.try_recv().unwrap().claim.data, json!({"n": 1}));
    assert!(slow.stream.try_recv().is_none());
    assert_eq!(store.claim_count(&p.key()), 5);
}

#[tokio::test]
async fn test_dropped_subscription_is_harmless() {
    let store = new_store();
    let p = Party::new();

    let dropped = store.subscribe(Some(&p.key()), None).await.unwrap();
    let mut kept = store.subscribe(Some(&p.key()), None).await.unwrap();
    drop(dropped);

    admit(&store, p.sign_claim_with(json!({"n": 1}), AccessDirective::public())).await;
    admit(&store, p.sign_claim(json!({"n": 2}))).await;

    assert_eq!(kept.stream.try_recv().unwrap().claim.data, json!({"n": 1}));
    assert_eq!(kept.stream.try_recv().unwrap().claim.data, json!({"n": 2}));
}

#[tokio::test]
async fn test_delete_identity_purges_everything() {
    let store = new_store();
    let parties = multi_party(2);
    let (x, other) = (&parties[0], &parties[1]);

    let first = admit(&store, x.sign_claim_with(json!({"n": 1}), AccessDirective::public())).await;
    let second = admit(&store, x.sign_claim(json!({"n": 2}))).await;
    let unrelated = admit(&store, other.sign_claim(json!({"n": 3}))).await;

    let certificate = claimchain::Certificate::new("x-cert");
    store.store_certificate(x.key(), certificate);

    let mut scoped = store.subscribe(Some(&x.key()), None).await.unwrap();
    let mut global_by_x = subscribe_as(&store, x, None).await;

    store.delete_identity(&x.key());

    assert_eq!(store.get_latest(&x.key()), None);
    assert!(store.chain(&x.key()).is_empty());
    for id in [&first, &second] {
        assert_eq!(store.get(id, Some(&x.prove_read(id))).await.unwrap(), None);
        assert_eq!(store.get(id, None).await.unwrap(), None);
        assert_eq!(store.get_owner(id), None);
    }
    assert_eq!(store.resolve_certificate(&x.key()), None);

    // Listeners tied to X end.
    assert!(scoped.stream.recv().await.is_none());
    assert!(global_by_x.stream.recv().await.is_none());

    // Other identities are untouched.
    assert_eq!(store.get_owner(&unrelated), Some(other.key()));
    assert_eq!(store.claim_count(&other.key()), 1);
}

#[tokio::test]
async fn test_identity_restarts_after_deletion() {
    let store = new_store();
    let p = Party::new();

    admit(&store, p.sign_claim_with(json!({"n": 1}), AccessDirective::public())).await;
    store.delete_identity(&p.key());

    let id = admit(&store, p.sign_claim(json!({"n": 2}))).await;
    let view = store.get(&id, Some(&p.prove_read(&id))).await.unwrap().unwrap();

    // Fresh chain, fresh (private) access list.
    assert_eq!(view.previous, None);
    assert!(!store.can_access(&id, None));
    assert_eq!(store.claim_count(&p.key()), 1);
}

#[tokio::test]
async fn test_resubmitting_after_deletion_is_admitted() {
    let store = new_store();
    let p = Party::new();
    let claim = p.sign_claim(json!({"need": "beer"}));

    admit(&store, claim.clone()).await;
    store.delete_identity(&p.key());
    store.delete_identity(&p.key());

    assert!(store.claim(claim).await.is_admitted());
}
