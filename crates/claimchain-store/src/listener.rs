//! Notification listeners and the streams they feed.
//!
//! A [`Listener`] is the store-side end: the accessor identity it filters on
//! and a bounded sender. The caller holds the [`ClaimStream`]. Delivery
//! never waits: a full buffer drops the event, a dropped stream closes the
//! listener.

use std::pin::Pin;
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::Stream;

use claimchain_core::{ClaimView, IdentityKey};

/// A newly admitted claim, as seen by a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub claim: ClaimView,
    /// The identity that admitted the claim.
    pub identity: IdentityKey,
}

/// Outcome of pushing one event to one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The subscriber's buffer was full; the event was dropped.
    Dropped,
    /// The subscriber went away.
    Closed,
}

/// Store-side end of a subscription.
#[derive(Debug)]
pub struct Listener {
    owner: Option<IdentityKey>,
    sender: mpsc::Sender<NotificationEvent>,
}

impl Listener {
    /// Create a listener and its stream.
    ///
    /// `owner` is the authenticated accessor the listener filters on, or
    /// `None` for an anonymous listener. A zero `capacity` is raised to one.
    pub fn channel(owner: Option<IdentityKey>, capacity: usize) -> (Listener, ClaimStream) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Listener { owner, sender }, ClaimStream { receiver })
    }

    /// The accessor identity this listener was registered for.
    pub fn owner(&self) -> Option<&IdentityKey> {
        self.owner.as_ref()
    }

    /// Whether the subscriber has dropped its stream.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Push an event without waiting.
    pub fn deliver(&self, event: NotificationEvent) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Caller-side end of a subscription: an endless stream of events.
///
/// The stream only ends once the store side is gone. Dropping it
/// unsubscribes.
#[derive(Debug)]
pub struct ClaimStream {
    receiver: mpsc::Receiver<NotificationEvent>,
}

impl ClaimStream {
    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.try_recv().ok()
    }

    /// Stop receiving. Buffered events can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Stream for ClaimStream {
    type Item = NotificationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
