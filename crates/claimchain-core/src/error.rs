//! Error types for Claimchain Core.

use thiserror::Error;

/// Core errors that can occur while handling keys, signatures and payloads.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// For verifiers that look references up rather than parse them.
    #[error("unknown identity reference: {0}")]
    UnknownIdentity(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
