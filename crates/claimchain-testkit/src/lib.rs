//! # Claimchain Testkit
//!
//! Testing utilities for claimchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: [`Party`], a keypair that signs claims and accessor proofs
//! - **Generators**: Proptest strategies for payloads, keys and directives
//!
//! ## Test Fixtures
//!
//! ```rust
//! use claimchain_testkit::fixtures::Party;
//! use serde_json::json;
//!
//! let party = Party::new();
//! let claim = party.sign_claim(json!({"need": "beer"}));
//! assert_eq!(claim.public_key, party.key());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party, Party};
