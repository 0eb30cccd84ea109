//! Notification fan-out.
//!
//! Scoped listeners live in their identity's record; the hub owns the
//! global listeners and pushes each admitted claim to both, filtered by the
//! same access evaluation used for reads.

use parking_lot::RwLock;
use tracing::{debug, warn};

use claimchain_core::{ClaimId, IdentityKey};
use claimchain_perms::evaluate;
use claimchain_store::{ClaimStream, Delivery, IdentityRecord, Listener, NotificationEvent};

/// Global listener registry and fan-out.
#[derive(Debug)]
pub struct NotificationHub {
    global: RwLock<Vec<Listener>>,
    buffer: usize,
}

impl NotificationHub {
    /// Create a hub whose listeners buffer `buffer` events each.
    pub fn new(buffer: usize) -> Self {
        Self {
            global: RwLock::new(Vec::new()),
            buffer,
        }
    }

    /// Create a listener for `owner` with this hub's buffer size.
    pub fn listener(&self, owner: Option<IdentityKey>) -> (Listener, ClaimStream) {
        Listener::channel(owner, self.buffer)
    }

    /// Register a listener that hears every identity's claims.
    pub fn register_global(&self, owner: Option<IdentityKey>) -> ClaimStream {
        let (listener, stream) = self.listener(owner);
        self.global.write().push(listener);
        stream
    }

    /// Push a newly admitted claim to every listener allowed to read it.
    ///
    /// Must be called inside the identity's exclusive section, right after
    /// the claim was appended to `record`. Returns the number of listeners
    /// that received the event.
    pub fn fan_out(&self, record: &mut IdentityRecord, claim_id: &ClaimId) -> usize {
        let Some(stored) = record.get(claim_id) else {
            return 0;
        };
        let owner = record.key();
        let event = NotificationEvent {
            claim: stored.view.clone(),
            identity: owner.clone(),
        };

        let push = |listener: &Listener| -> Option<Delivery> {
            if !evaluate(owner, record.access(), &stored.access, listener.owner()).is_granted() {
                return None;
            }
            let delivery = listener.deliver(event.clone());
            if delivery == Delivery::Dropped {
                warn!(
                    identity = %owner,
                    claim_id = %claim_id,
                    "subscriber buffer full, dropping notification"
                );
            }
            Some(delivery)
        };

        let scoped: Vec<Delivery> = record.observers().iter().filter_map(&push).collect();
        let global: Vec<Delivery> = self.global.read().iter().filter_map(&push).collect();

        let sent = |deliveries: &[Delivery]| {
            deliveries.iter().filter(|d| **d == Delivery::Sent).count()
        };
        let delivered = sent(&scoped) + sent(&global);
        let scoped_closed = scoped.contains(&Delivery::Closed);
        let global_closed = global.contains(&Delivery::Closed);

        if scoped_closed {
            let pruned = record.prune_closed_observers();
            if pruned > 0 {
                debug!(identity = %record.key(), pruned, "pruned closed subscribers");
            }
        }
        if global_closed {
            self.prune_global();
        }

        delivered
    }

    fn prune_global(&self) {
        let mut global = self.global.write();
        let before = global.len();
        global.retain(|l| !l.is_closed());
        debug!(pruned = before - global.len(), "pruned closed global subscribers");
    }

    /// Drop global listeners registered on behalf of `owner`.
    pub fn remove_global_owned_by(&self, owner: &IdentityKey) -> usize {
        let mut global = self.global.write();
        let before = global.len();
        global.retain(|l| l.owner() != Some(owner));
        before - global.len()
    }

    /// Number of registered global listeners.
    pub fn global_count(&self) -> usize {
        self.global.read().len()
    }
}
