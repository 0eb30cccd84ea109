//! # Claimchain Core
//!
//! Pure primitives for claimchain: identities, claims, access directives,
//! reference encodings and the canonical payload encoding that claims are
//! signed over.
//!
//! This crate contains no storage and no I/O. Signature checking is exposed
//! through the [`IdentityVerifier`] trait so the store never depends on a
//! particular key scheme; [`Ed25519Verifier`] is the stock implementation.
//!
//! ## Key Types
//!
//! - [`IdentityKey`] - Public-key reference that owns a chain of claims
//! - [`ClaimId`] - Globally unique claim identifier (the claim's signature)
//! - [`SignedClaim`] - An incoming claim submission
//! - [`ClaimView`] - The outward shape of a stored claim
//! - [`AccessDirective`] - Who besides the owner may read a claim
//!
//! ## Canonicalization
//!
//! Claim payloads are JSON values, signed over their deterministic CBOR
//! encoding. See [`canonical`] module.

pub mod canonical;
pub mod claim;
pub mod crypto;
pub mod error;
pub mod reference;
pub mod types;

pub use canonical::canonical_bytes;
pub use claim::{
    AccessDirective, AccessorProof, ClaimSubmission, ClaimView, DirectiveGrant, SignedClaim,
    ALLOW_KEY,
};
pub use crypto::{Ed25519Identity, Ed25519Verifier, IdentityHandle, IdentityVerifier, Keypair};
pub use error::{CoreError, Result};
pub use types::{Certificate, ClaimId, IdentityKey, Signature};
