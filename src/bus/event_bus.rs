//! Session-scoped publish/subscribe bus.
//!
//! Subscribers do not register callbacks. Each subscription owns a mailbox
//! that `publish` fills synchronously, in publish order; the owner drains it
//! when it is ready to react. Dropping a subscription is explicit through
//! [`EventBus::unsubscribe`].

use std::collections::VecDeque;

use serde_json::Value;

use super::kind::EventKind;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// One published event
#[derive(Clone, Debug, PartialEq)]
pub struct BusEvent {
    pub kind: EventKind,
    pub payload: Value,
}

#[derive(Debug)]
struct Subscription {
    id: SubscriptionId,
    kinds: Vec<EventKind>,
    inbox: VecDeque<BusEvent>,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every subscription interested in `kind`.
    ///
    /// Returns the number of mailboxes the event landed in.
    pub fn publish(&mut self, kind: EventKind, payload: Value) -> usize {
        let mut delivered = 0;
        for subscription in self.subscriptions.iter_mut().filter(|s| s.wants(kind)) {
            subscription.inbox.push_back(BusEvent {
                kind,
                payload: payload.clone(),
            });
            delivered += 1;
        }
        delivered
    }

    pub fn subscribe(&mut self, kind: EventKind) -> SubscriptionId {
        self.subscribe_many(&[kind])
    }

    /// One mailbox receiving all of `kinds`, interleaved in publish order
    pub fn subscribe_many(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kinds: kinds.to_vec(),
            inbox: VecDeque::new(),
        });
        id
    }

    /// Remove a subscription and discard its undelivered events
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Take every pending event for a subscription, oldest first
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<BusEvent> {
        self.subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| s.inbox.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.subscriptions
            .iter()
            .find(|s| s.id == id)
            .map_or(0, |s| s.inbox.len())
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
