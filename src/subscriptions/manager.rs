//! Subscription manager: key-indexed notification dispatch.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{NotificationOptions, StoreItem};

use super::types::{NotificationFn, Subscriber, SubscriberId, Subscription};

/// The central registry for all subscriptions, indexed by key.
pub struct SubscriptionManager {
    /// Active subscriptions by key, created lazily.
    subscriptions: RwLock<HashMap<String, Arc<Subscription>>>,
    /// Counter for generating subscriber IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the subscription for `key`, lazily creating and registering
    /// it on first use. Idempotent per key.
    pub fn get_subscription(&self, key: &str) -> Arc<Subscription> {
        if let Some(existing) = self.subscriptions.read().get(key) {
            return Arc::clone(existing);
        }
        let mut subscriptions = self.subscriptions.write();
        Arc::clone(
            subscriptions
                .entry(key.to_string())
                .or_insert_with(|| Subscription::new(key)),
        )
    }

    /// Registers a callback for `key` and returns the subscriber handle.
    pub(crate) fn add_subscriber(
        &self,
        key: &str,
        callback: Box<NotificationFn>,
    ) -> Arc<Subscriber> {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.get_subscription(key)
            .add_subscriber(Subscriber::new(id, callback))
    }

    /// Dispatches a changed item to the subscription for its key. A key
    /// nobody has subscribed to is a no-op, not an error. Within one key,
    /// subscribers are notified in registration order; there is no ordering
    /// guarantee across different keys.
    pub fn notify(&self, item: &StoreItem, options: &NotificationOptions) {
        let subscription = self.subscriptions.read().get(&item.key).cloned();
        if let Some(subscription) = subscription {
            subscription.notify(item, options);
        }
    }

    /// Number of distinct keys with a registered subscription.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
