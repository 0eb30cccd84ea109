//! Strong type definitions for claimchain.
//!
//! Identities, claim ids and signatures all travel as text references, so
//! each gets a newtype to keep them from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Render at most the first 16 characters of a reference.
fn abbreviated(s: &str) -> &str {
    match s.char_indices().nth(16) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// A public-key reference identifying an identity.
///
/// Usually the hex encoding of an Ed25519 public key, but any reference the
/// configured verifier can resolve (a certificate fingerprint, for example)
/// is a valid identity key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap an existing reference.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The reference as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({})", abbreviated(&self.0))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for IdentityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A hex-encoded signing output.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Wrap an already-encoded signature.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encode raw Ed25519 signature bytes.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Decode to raw Ed25519 signature bytes.
    pub fn to_bytes(&self) -> Result<[u8; 64]> {
        let bytes =
            hex::decode(&self.0).map_err(|e| CoreError::InvalidSignature(e.to_string()))?;
        bytes
            .try_into()
            .map_err(|_| CoreError::InvalidSignature("expected 64 bytes".into()))
    }

    /// The encoded signature as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", abbreviated(&self.0))
    }
}

/// Globally unique claim identifier.
///
/// A claim is identified by its own signature, so two submissions carrying
/// the same signature are the same claim.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(String);

impl ClaimId {
    /// Wrap an existing claim id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The signature this id was derived from.
    pub fn to_signature(&self) -> Signature {
        Signature(self.0.clone())
    }
}

impl From<&Signature> for ClaimId {
    fn from(signature: &Signature) -> Self {
        Self(signature.0.clone())
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({})", abbreviated(&self.0))
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque certificate, stored against a key fingerprint.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Certificate(String);

impl Certificate {
    /// Wrap certificate text (PEM or an alternate-encoding reference).
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The certificate text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blake3 fingerprint of the certificate text, usable as an identity key.
    pub fn fingerprint(&self) -> IdentityKey {
        IdentityKey(blake3::hash(self.0.as_bytes()).to_hex().to_string())
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate({}...)", abbreviated(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_bytes_roundtrip() {
        let sig = Signature::from_bytes(&[0x42; 64]);
        assert_eq!(sig.as_str().len(), 128);
        assert_eq!(sig.to_bytes().unwrap(), [0x42; 64]);
    }

    #[test]
    fn test_signature_rejects_wrong_length() {
        let sig = Signature::new("abcd");
        assert!(matches!(sig.to_bytes(), Err(CoreError::InvalidSignature(_))));

        let sig = Signature::new("not hex at all");
        assert!(sig.to_bytes().is_err());
    }

    #[test]
    fn test_claim_id_is_signature() {
        let sig = Signature::from_bytes(&[0xab; 64]);
        let id = ClaimId::from(&sig);
        assert_eq!(id.as_str(), sig.as_str());
        assert_eq!(id.to_signature(), sig);
    }

    #[test]
    fn test_debug_is_abbreviated() {
        let key = IdentityKey::new("0123456789abcdef0123456789abcdef");
        assert_eq!(format!("{:?}", key), "IdentityKey(0123456789abcdef)");

        let short = IdentityKey::new("abc");
        assert_eq!(format!("{:?}", short), "IdentityKey(abc)");
    }

    #[test]
    fn test_certificate_fingerprint_deterministic() {
        let cert = Certificate::new("-----BEGIN CERTIFICATE-----");
        assert_eq!(cert.fingerprint(), cert.fingerprint());
        assert_ne!(cert.fingerprint(), Certificate::new("other").fingerprint());
        assert_eq!(cert.fingerprint().as_str().len(), 64);
    }
}
