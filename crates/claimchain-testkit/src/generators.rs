//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use claimchain_core::{AccessDirective, IdentityKey, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate an identity key backed by a real Ed25519 key.
pub fn identity_key() -> impl Strategy<Value = IdentityKey> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a scalar JSON value.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<u64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,16}".prop_map(Value::String),
    ]
}

/// Generate a JSON payload, nested up to `depth` levels.
///
/// Keys never start with `@`, so generated payloads carry no directive.
pub fn payload(depth: u32) -> impl Strategy<Value = Value> {
    scalar().prop_recursive(depth, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate an object payload, the shape claims are usually made in.
pub fn object_payload() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,8}", payload(2), 0..6)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

/// Generate an unscoped directive: public, or granting a random identity.
pub fn directive() -> impl Strategy<Value = AccessDirective> {
    prop_oneof![
        Just(AccessDirective::public()),
        identity_key().prop_map(|key| AccessDirective::grant(&key)),
    ]
}
