//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use claimchain_core::{
    canonical_bytes, AccessDirective, AccessorProof, ClaimId, IdentityKey, Keypair, Signature,
    SignedClaim,
};

/// A party holding a keypair, able to sign claims and accessor proofs.
#[derive(Debug, Clone)]
pub struct Party {
    pub keypair: Keypair,
}

impl Default for Party {
    fn default() -> Self {
        Self::new()
    }
}

impl Party {
    /// Create a party with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The party's identity key.
    pub fn key(&self) -> IdentityKey {
        self.keypair.identity()
    }

    /// Sign a payload without an out-of-band directive.
    pub fn sign_claim(&self, message: serde_json::Value) -> SignedClaim {
        SignedClaim {
            signature: self.sign_payload(&message),
            public_key: self.key(),
            message,
            access: None,
        }
    }

    /// Sign a payload and attach `directive` out of band.
    pub fn sign_claim_with(
        &self,
        message: serde_json::Value,
        directive: AccessDirective,
    ) -> SignedClaim {
        SignedClaim {
            access: Some(directive),
            ..self.sign_claim(message)
        }
    }

    /// A claim whose signature does not match its payload.
    pub fn forge_claim(&self, message: serde_json::Value) -> SignedClaim {
        let signature = self.sign_payload(&serde_json::json!({ "forged": message.clone() }));
        SignedClaim {
            signature,
            public_key: self.key(),
            message,
            access: None,
        }
    }

    /// Proof for reading `claim_id`.
    pub fn prove_read(&self, claim_id: &ClaimId) -> AccessorProof {
        AccessorProof::new(self.key(), self.keypair.sign(claim_id.as_str().as_bytes()))
    }

    /// Proof for subscribing to `identity`, or to everyone with `None`.
    pub fn prove_subscribe(&self, identity: Option<&IdentityKey>) -> AccessorProof {
        let message = identity.map_or("null", |key| key.as_str());
        AccessorProof::new(self.key(), self.keypair.sign(message.as_bytes()))
    }

    /// A proof claiming this party's key but signed by `impostor`.
    pub fn impersonated_by(&self, impostor: &Party, claim_id: &ClaimId) -> AccessorProof {
        AccessorProof::new(
            self.key(),
            impostor.keypair.sign(claim_id.as_str().as_bytes()),
        )
    }

    fn sign_payload(&self, message: &serde_json::Value) -> Signature {
        self.keypair.sign(&canonical_bytes(message))
    }
}

/// Create `count` parties with deterministic, distinct seeds.
pub fn multi_party(count: usize) -> Vec<Party> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = (i >> 8) as u8;
            seed[31] = 0xC1;
            Party::with_seed(seed)
        })
        .collect()
}
