//! Subscriber and subscription types.

use crate::types::{NotificationOptions, StoreItem};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Callback invoked when a subscribed store item changes.
pub type NotificationFn = dyn Fn(&StoreItem, &NotificationOptions) + Send + Sync;

/// Unique identifier for a subscriber within one store.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

/// A registered notification callback.
///
/// The owning context of the original callback shape lives inside the
/// closure capture (see `Store::subscribe_bound` for the explicitly bound
/// form). The back-reference to the owning subscription is weak: it is used
/// only for removal, never for ownership.
pub struct Subscriber {
    id: SubscriberId,
    callback: Box<NotificationFn>,
    subscription: RwLock<Weak<Subscription>>,
}

impl Subscriber {
    pub(crate) fn new(id: SubscriberId, callback: Box<NotificationFn>) -> Arc<Self> {
        Arc::new(Self {
            id,
            callback,
            subscription: RwLock::new(Weak::new()),
        })
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Stops receiving notifications. Idempotent: unsubscribing twice (or
    /// after the subscription is gone) is a silent no-op.
    pub fn unsubscribe(&self) {
        let owner = self.subscription.read().upgrade();
        if let Some(subscription) = owner {
            subscription.remove_subscriber(self.id);
        }
    }

    /// Invokes the subscribed callback with the changed item.
    pub(crate) fn notify(&self, item: &StoreItem, options: &NotificationOptions) {
        (self.callback)(item, options);
    }

    pub(crate) fn attach(&self, subscription: &Arc<Subscription>) {
        *self.subscription.write() = Arc::downgrade(subscription);
    }

    pub(crate) fn detach(&self) {
        *self.subscription.write() = Weak::new();
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

/// All subscribers listening for changes to one specific key.
pub struct Subscription {
    key: String,
    subscribers: RwLock<Vec<Arc<Subscriber>>>,
}

impl Subscription {
    pub(crate) fn new(key: &str) -> Arc<Self> {
        Arc::new(Self {
            key: key.to_string(),
            subscribers: RwLock::new(Vec::new()),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Appends a subscriber, sets its back-reference, and returns it
    /// (builder-style).
    pub(crate) fn add_subscriber(self: &Arc<Self>, subscriber: Arc<Subscriber>) -> Arc<Subscriber> {
        subscriber.attach(self);
        self.subscribers.write().push(Arc::clone(&subscriber));
        subscriber
    }

    /// Removes the first subscriber with a matching id and clears its
    /// back-reference. Silently no-ops when the subscriber is not present,
    /// keeping unsubscribe idempotent.
    pub(crate) fn remove_subscriber(&self, id: SubscriberId) {
        let removed = {
            let mut subscribers = self.subscribers.write();
            subscribers
                .iter()
                .position(|s| s.id() == id)
                .map(|index| subscribers.remove(index))
        };
        if let Some(subscriber) = removed {
            subscriber.detach();
        }
    }

    /// Notifies every subscriber synchronously, in registration order.
    ///
    /// The subscriber list is snapshotted first so callbacks may re-enter
    /// the store (subscribe, unsubscribe, set items) without deadlocking;
    /// such changes take effect from the next notification. Delivery is not
    /// isolated: a panicking callback aborts delivery to later subscribers
    /// of this key.
    pub(crate) fn notify(&self, item: &StoreItem, options: &NotificationOptions) {
        let snapshot: Vec<Arc<Subscriber>> = self.subscribers.read().clone();
        for subscriber in &snapshot {
            subscriber.notify(item, options);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
