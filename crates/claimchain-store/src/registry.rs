//! The claim chain registry: one lock per identity.
//!
//! The registry map is only locked long enough to find or insert a record.
//! All reads and writes of a record's contents happen under that record's
//! own mutex, so writers for different identities proceed in parallel and
//! writers for the same identity are serialised.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use claimchain_core::IdentityKey;

use crate::chain::IdentityRecord;

type SharedRecord = Arc<Mutex<IdentityRecord>>;

/// Registry of identity records.
#[derive(Debug, Default)]
pub struct ClaimChainStore {
    identities: RwLock<HashMap<IdentityKey, SharedRecord>>,
}

impl ClaimChainStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, key: &IdentityKey) -> Option<SharedRecord> {
        self.identities.read().get(key).cloned()
    }

    fn get_or_create(&self, key: &IdentityKey) -> SharedRecord {
        if let Some(record) = self.lookup(key) {
            return record;
        }
        self.identities
            .write()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(IdentityRecord::new(key.clone()))))
            .clone()
    }

    /// Run `f` in the identity's exclusive section, creating the record if
    /// absent.
    ///
    /// If the record is retired between lookup and locking, the section is
    /// retried on the record that replaces it.
    pub fn exclusive<R>(&self, key: &IdentityKey, f: impl FnOnce(&mut IdentityRecord) -> R) -> R {
        loop {
            let record = self.get_or_create(key);
            let mut guard = record.lock();
            if guard.is_retired() {
                drop(guard);
                self.discard(key, &record);
                continue;
            }
            return f(&mut guard);
        }
    }

    /// Run `f` against an existing record. `None` if the identity is unknown.
    pub fn read<R>(&self, key: &IdentityKey, f: impl FnOnce(&IdentityRecord) -> R) -> Option<R> {
        let record = self.lookup(key)?;
        let guard = record.lock();
        if guard.is_retired() {
            return None;
        }
        Some(f(&guard))
    }

    /// Delete an identity's record.
    ///
    /// `f` runs in the record's exclusive section just before it is retired,
    /// so index cleanup cannot interleave with an admission for the same
    /// identity. Returns `None` if the identity was unknown.
    pub fn delete<R>(&self, key: &IdentityKey, f: impl FnOnce(&mut IdentityRecord) -> R) -> Option<R> {
        let record = self.lookup(key)?;
        let mut guard = record.lock();
        if guard.is_retired() {
            return None;
        }
        let result = f(&mut guard);
        guard.retire();
        drop(guard);
        self.discard(key, &record);
        Some(result)
    }

    /// Remove `record` from the map if it is still the one registered.
    fn discard(&self, key: &IdentityKey, record: &SharedRecord) {
        let mut identities = self.identities.write();
        if identities
            .get(key)
            .map_or(false, |current| Arc::ptr_eq(current, record))
        {
            identities.remove(key);
        }
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.identities.read().contains_key(key)
    }

    /// Number of identities with a record.
    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.read().is_empty()
    }
}
