//! Error types for the store facade.

use claimchain_core::{CoreError, IdentityKey};
use thiserror::Error;

/// Errors surfaced by [`EphemeralStore`](crate::EphemeralStore).
///
/// Rejected claims, denied reads and unknown ids are not errors; they come
/// back as [`AdmitResult::Rejected`](crate::AdmitResult) or `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An accessor proof did not verify: the request is forged or malformed.
    #[error("authentication failed for accessor {accessor}")]
    AuthenticationFailed { accessor: IdentityKey },

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
