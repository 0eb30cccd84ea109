//! # Claimchain Store
//!
//! In-memory, identity-partitioned claim storage.
//!
//! ## Overview
//!
//! Each identity owns an [`IdentityRecord`]: its claims keyed by claim id,
//! the `last` pointer that heads its hash-linked chain, its identity-wide
//! ACL and the listeners scoped to it. [`ClaimChainStore`] keeps one
//! record per identity behind its own lock, so writers for different
//! identities never contend. [`IdentityIndex`] maps claim ids back to their
//! owners and keeps the fingerprint-to-certificate table.
//!
//! ## Key Types
//!
//! - [`ClaimChainStore`] - Registry of identity records with exclusive sections
//! - [`IdentityRecord`] - One identity's chain, ACL and observers
//! - [`IdentityIndex`] - Claim owners and certificates
//! - [`Listener`] / [`ClaimStream`] - The two ends of a notification channel
//!
//! ## Design Notes
//!
//! - **Idempotent appends**: Appending an id that already exists returns `AlreadyExists`
//! - **Retirement**: A deleted record is retired under its own lock, so a writer
//!   that raced the deletion notices and starts over on a fresh record
//! - **Non-blocking delivery**: Listeners use bounded channels and drop on overflow

pub mod chain;
pub mod index;
pub mod listener;
pub mod registry;

pub use chain::{IdentityRecord, InsertResult, StoredClaim};
pub use index::IdentityIndex;
pub use listener::{ClaimStream, Delivery, Listener, NotificationEvent};
pub use registry::ClaimChainStore;
