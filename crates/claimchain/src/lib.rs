//! # Claimchain
//!
//! An ephemeral, in-memory store for signed claims.
//!
//! ## Overview
//!
//! Any identity holding an Ed25519 key can submit claims: arbitrary JSON
//! payloads signed over their canonical encoding. The store keeps:
//!
//! - **Chains**: Each identity's claims, linked newest to oldest by claim id
//! - **Access lists**: Identity-wide and per-claim, public or an allow-set
//! - **Subscriptions**: Live, access-filtered notification of new claims
//! - **Certificates**: A fingerprint-to-certificate side table
//!
//! ## Key Concepts
//!
//! - **Claim id**: The claim's signature. Re-submitting a claim is a no-op.
//! - **Owner**: The identity whose key signed a claim. Always has access.
//! - **Directive**: An instruction attached to a claim that opens access,
//!   either identity-wide or scoped to one of the owner's earlier claims.
//! - **Accessor proof**: A signature showing the caller holds the key they
//!   read or subscribe as.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use claimchain::{AccessDirective, EphemeralStore, SignedClaim};
//! use claimchain::core::{canonical_bytes, Ed25519Verifier, Keypair};
//! use serde_json::json;
//!
//! async fn example() {
//!     let store = EphemeralStore::with_defaults(Ed25519Verifier::new());
//!     let keypair = Keypair::generate();
//!
//!     let message = json!({"need": "beer"});
//!     let claim = SignedClaim {
//!         signature: keypair.sign(&canonical_bytes(&message)),
//!         public_key: keypair.identity(),
//!         message,
//!         access: Some(AccessDirective::public()),
//!     };
//!
//!     let admitted = store.claim(claim).await;
//!     let claim_id = admitted.claim_id().cloned().unwrap();
//!     let view = store.get(&claim_id, None).await.unwrap();
//!     assert!(view.is_some());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `claimchain::core` - Claim types, canonical encoding, signatures
//! - `claimchain::perms` - Access lists and access evaluation
//! - `claimchain::store` - Identity records, indexes and listeners

pub mod config;
pub mod ephemeral;
pub mod error;
pub mod hub;

// Re-export component crates
pub use claimchain_core as core;
pub use claimchain_perms as perms;
pub use claimchain_store as store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use hub::NotificationHub;
pub use ephemeral::{AdmitResult, EphemeralStore, Registered, Subscription, GLOBAL_SUBSCRIPTION_TOKEN};

// Re-export commonly used types
pub use claimchain_core::{
    AccessDirective, AccessorProof, Certificate, ClaimId, ClaimView, IdentityKey, SignedClaim,
};
pub use claimchain_store::{ClaimStream, NotificationEvent};
