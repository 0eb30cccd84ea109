//! Identity verification.
//!
//! The store never checks signatures itself. It consumes an
//! [`IdentityVerifier`] that resolves an identity reference to an
//! [`IdentityHandle`] and checks message/signature pairs against it.
//! [`Ed25519Verifier`] resolves hex-encoded Ed25519 public keys.

use async_trait::async_trait;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::reference::identity_from_reference;
use crate::types::{IdentityKey, Signature};

/// A resolved identity, able to check signatures made by it.
pub trait IdentityHandle: Send + Sync {
    /// The identity this handle was resolved from.
    fn key(&self) -> &IdentityKey;

    /// Whether `signature` is a valid signature by this identity over `message`.
    fn verify(&self, message: &[u8], signature: &Signature) -> bool;
}

/// Resolves identity references and verifies signatures.
///
/// Resolution may be slow (network lookups, certificate chains), which is
/// why the store calls this before entering any exclusive section.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a reference to a handle capable of verification.
    async fn resolve(&self, reference: &IdentityKey) -> Result<Box<dyn IdentityHandle>>;

    /// Verify a signature by `reference` over `message`.
    ///
    /// A reference that cannot be resolved never verifies.
    async fn verify(&self, message: &[u8], signature: &Signature, reference: &IdentityKey) -> bool {
        match self.resolve(reference).await {
            Ok(handle) => handle.verify(message, signature),
            Err(_) => false,
        }
    }
}

/// An Ed25519 public key resolved from an identity reference.
pub struct Ed25519Identity {
    key: IdentityKey,
    verifying_key: VerifyingKey,
}

impl Ed25519Identity {
    /// Parse a hex-encoded public key, optionally given as an identity reference.
    pub fn from_reference(reference: &IdentityKey) -> Result<Self> {
        let key = identity_from_reference(reference.as_str()).unwrap_or_else(|| reference.clone());

        let bytes =
            hex::decode(key.as_str()).map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidPublicKey("expected 32 bytes".into()))?;
        let verifying_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;

        Ok(Self { key, verifying_key })
    }
}

impl IdentityHandle for Ed25519Identity {
    fn key(&self) -> &IdentityKey {
        &self.key
    }

    fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(bytes) = signature.to_bytes() else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&bytes);
        self.verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for Ed25519Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Identity({:?})", self.key)
    }
}

/// Verifier for hex-encoded Ed25519 identity keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityVerifier for Ed25519Verifier {
    async fn resolve(&self, reference: &IdentityKey) -> Result<Box<dyn IdentityHandle>> {
        Ok(Box::new(Ed25519Identity::from_reference(reference)?))
    }
}

/// An Ed25519 keypair for signing claims and accessor proofs.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The hex-encoded public key, usable as an identity key.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(hex::encode(self.signing_key.verifying_key().to_bytes()))
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(&self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.identity())
    }
}
