//! The versioned store at the heart of the framework.
//!
//! The store is an ordered, append-only sequence of immutable versions,
//! each version a snapshot mapping of key → [`StoreItem`]. Rewinding
//! truncates the tail of that sequence (browser "back"); appending replays
//! previously truncated versions (browser "forward"). Every mutation
//! delivers synchronous notifications to the subscribers of the changed
//! key.

use crate::error::{Result, RetraceError};
use crate::subscriptions::{Subscriber, SubscriptionManager};
use crate::types::{NotificationOptions, StoreItem, Version, VersionNumber};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Observer informed after every set operation.
///
/// The router registers itself here so it can invalidate its
/// forward-navigation buffer whenever a non-routing key changes.
pub trait StoreObserver: Send + Sync {
    fn on_set_item(&self, item: &StoreItem);
}

/// The versioned key-value store.
///
/// Constructed once per application and passed explicitly to the router and
/// components; there is no ambient global instance. The store lives for the
/// page session and has no teardown.
pub struct Store {
    /// Ordered version history, dense and gapless: `versions[i].number == i`
    /// (until replayed versions are appended out of band).
    versions: RwLock<Vec<Version>>,

    /// When set, every `set_item` appends a new version instead of
    /// extending the current one in place.
    preserve_history: AtomicBool,

    /// Per-key subscriber registry.
    subscriptions: SubscriptionManager,

    /// Backlink to the router. Weak: the router owns the store, not the
    /// other way around.
    observer: RwLock<Option<Weak<dyn StoreObserver>>>,
}

impl Store {
    /// Create a new, empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            versions: RwLock::new(Vec::new()),
            preserve_history: AtomicBool::new(false),
            subscriptions: SubscriptionManager::new(),
            observer: RwLock::new(None),
        })
    }

    /// Registers the observer called back after every set.
    pub fn set_observer(&self, observer: Weak<dyn StoreObserver>) {
        *self.observer.write() = Some(observer);
    }

    /// Whether version history is preserved across `set_item` calls.
    pub fn preserve_history(&self) -> bool {
        self.preserve_history.load(Ordering::Relaxed)
    }

    /// When set to true, each state change creates a new version.
    pub fn set_preserve_history(&self, value: bool) {
        self.preserve_history.store(value, Ordering::Relaxed);
    }

    pub fn version_count(&self) -> usize {
        self.versions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.read().is_empty()
    }

    /// Number of the latest version, if any.
    pub fn current_version_number(&self) -> Option<VersionNumber> {
        self.versions.read().last().map(|v| v.number)
    }

    // --- Read Operations ---

    /// Gets a store item at the latest version.
    ///
    /// Returns `None` when no versions exist or the key is absent.
    pub fn get_item(&self, key: &str) -> Option<Arc<StoreItem>> {
        let versions = self.versions.read();
        Self::resolve(&versions, None).and_then(|version| version.get(key).cloned())
    }

    /// Gets a store item at a given version index.
    ///
    /// An index past the end of the history resolves to the latest version.
    pub fn get_item_at(&self, key: &str, version: usize) -> Option<Arc<StoreItem>> {
        let versions = self.versions.read();
        Self::resolve(&versions, Some(version)).and_then(|v| v.get(key).cloned())
    }

    /// Gets all store items at the latest version.
    pub fn get_items(&self) -> Option<HashMap<String, Arc<StoreItem>>> {
        let versions = self.versions.read();
        Self::resolve(&versions, None).map(|version| version.data.clone())
    }

    /// Gets all store items at a given version index.
    pub fn get_items_at(&self, version: usize) -> Option<HashMap<String, Arc<StoreItem>>> {
        let versions = self.versions.read();
        Self::resolve(&versions, Some(version)).map(|v| v.data.clone())
    }

    /// Gets all keys present at the latest version.
    pub fn get_keys(&self) -> Option<Vec<String>> {
        let versions = self.versions.read();
        Self::resolve(&versions, None).map(|version| version.data.keys().cloned().collect())
    }

    /// Gets all keys present at a given version index.
    pub fn get_keys_at(&self, version: usize) -> Option<Vec<String>> {
        let versions = self.versions.read();
        Self::resolve(&versions, Some(version)).map(|v| v.data.keys().cloned().collect())
    }

    /// Scans versions newest to oldest and returns the index of the most
    /// recent version where `predicate` holds for the item at `key`.
    /// Versions lacking the key are skipped without invoking the predicate.
    ///
    /// The predicate runs with the version list borrowed; it must not call
    /// back into the store.
    pub fn find_latest_matching_version_number(
        &self,
        key: &str,
        predicate: impl Fn(&StoreItem) -> bool,
    ) -> Option<usize> {
        let versions = self.versions.read();
        for index in (0..versions.len()).rev() {
            if let Some(item) = versions[index].get(key) {
                if predicate(item) {
                    return Some(index);
                }
            }
        }
        None
    }

    fn resolve<'a>(versions: &'a [Version], version: Option<usize>) -> Option<&'a Version> {
        if versions.is_empty() {
            return None;
        }
        match version {
            Some(index) if index < versions.len() => versions.get(index),
            _ => versions.last(),
        }
    }

    // --- Write Operations ---

    /// Stores a new item for `key` at the current version.
    ///
    /// With `preserve_history` unset (the default) the current version is
    /// extended in place; with it set, a new version is appended first,
    /// carrying forward all keys of the previous version. Subscribers of
    /// `key` are notified synchronously with empty options, then the
    /// observer is informed. The first version created is version 0.
    pub fn set_item(&self, key: &str, value: Value) -> Arc<StoreItem> {
        self.write_item(key, value, self.preserve_history())
    }

    /// Stores a new item for `key`, unconditionally appending a new version
    /// regardless of `preserve_history`.
    ///
    /// Used for router-originated navigation state so that every route
    /// change is independently rewindable.
    pub fn set_item_at_next_version(&self, key: &str, value: Value) -> Arc<StoreItem> {
        self.write_item(key, value, true)
    }

    fn write_item(&self, key: &str, value: Value, new_version: bool) -> Arc<StoreItem> {
        let item = Arc::new(StoreItem::new(key, value));
        {
            let mut versions = self.versions.write();
            if versions.is_empty() {
                // the first version is version 0
                versions.push(Version::new(VersionNumber(0)));
            } else if new_version {
                let next = versions[versions.len() - 1].derive_next();
                versions.push(next);
            }
            if let Some(current) = versions.last_mut() {
                current.data.insert(item.key.clone(), Arc::clone(&item));
            }
        }

        // Lock released before delivery: callbacks may re-enter the store.
        self.subscriptions
            .notify(&item, &NotificationOptions::default());
        self.notify_observer(&item);
        item
    }

    /// Truncates the version history to `[0..version]` inclusive and fires
    /// notifications (with empty options) for every item in the now-current
    /// version.
    ///
    /// Returns the truncated-off suffix, oldest first, so the caller can
    /// replay it later via [`Store::append_version`]. Fails with
    /// `InvalidArgument` when `version` is out of range (an empty store has
    /// no in-range version).
    pub fn rewind_to_version(&self, version: usize) -> Result<Vec<Version>> {
        let (excluded, current_items) = {
            let mut versions = self.versions.write();
            if version >= versions.len() {
                return Err(RetraceError::InvalidArgument(format!(
                    "rewind target {} must be less than the size of the versions list ({})",
                    version,
                    versions.len()
                )));
            }
            let excluded = versions.split_off(version + 1);
            let current_items: Vec<Arc<StoreItem>> =
                versions[version].data.values().cloned().collect();
            (excluded, current_items)
        };

        tracing::debug!(version, truncated = excluded.len(), "store rewound");

        for item in &current_items {
            self.subscriptions
                .notify(item, &NotificationOptions::default());
        }
        Ok(excluded)
    }

    /// Pushes a previously removed (or externally constructed) version onto
    /// the tail without validation. Used to replay forward-navigation
    /// versions exactly as they were, original version numbers included.
    pub fn append_version(&self, version: Version) {
        self.versions.write().push(version);
    }

    /// Fires notifications for every item in the latest version.
    ///
    /// Used after a routing change so subscribers of keys other than the
    /// one that changed re-render too. No-op on an empty store.
    pub fn send_notifications_for_current_version(&self, options: &NotificationOptions) {
        let current_items: Vec<Arc<StoreItem>> = {
            let versions = self.versions.read();
            match versions.last() {
                Some(version) => version.data.values().cloned().collect(),
                None => return,
            }
        };
        for item in &current_items {
            self.subscriptions.notify(item, options);
        }
    }

    // --- Subscriptions ---

    /// Subscribes to state changes for `key`.
    ///
    /// The callback is invoked synchronously on every change with the new
    /// item and the notification options. Returns the subscriber handle;
    /// call `unsubscribe()` on it to stop receiving notifications.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Arc<Subscriber>
    where
        F: Fn(&StoreItem, &NotificationOptions) + Send + Sync + 'static,
    {
        self.subscriptions.add_subscriber(key, Box::new(callback))
    }

    /// Subscribes with an explicitly bound owning context, the second of
    /// the two supported call shapes. The context is passed to the callback
    /// on every notification.
    pub fn subscribe_bound<C, F>(&self, key: &str, context: Arc<C>, callback: F) -> Arc<Subscriber>
    where
        C: Send + Sync + 'static,
        F: Fn(&C, &StoreItem, &NotificationOptions) + Send + Sync + 'static,
    {
        self.subscribe(key, move |item, options| callback(&context, item, options))
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    fn notify_observer(&self, item: &StoreItem) {
        let observer = { self.observer.read().as_ref().and_then(Weak::upgrade) };
        if let Some(observer) = observer {
            observer.on_set_item(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_first_set_creates_version_zero() {
        let store = Store::new();
        assert!(store.is_empty());

        store.set_item("a", json!(1));
        assert_eq!(store.version_count(), 1);
        assert_eq!(store.current_version_number(), Some(VersionNumber(0)));
    }

    #[test]
    fn test_set_item_extends_in_place_by_default() {
        let store = Store::new();
        for n in 0..5 {
            store.set_item("a", json!(n));
        }
        assert_eq!(store.version_count(), 1);
        assert_eq!(store.get_item("a").unwrap().value, json!(4));
    }

    #[test]
    fn test_preserve_history_appends_per_set() {
        let store = Store::new();
        store.set_preserve_history(true);

        for n in 0..4 {
            store.set_item("a", json!(n));
        }
        assert_eq!(store.version_count(), 4);

        // every past version still reads its own value
        for v in 0..4 {
            assert_eq!(store.get_item_at("a", v).unwrap().value, json!(v));
        }
    }

    #[test]
    fn test_set_item_at_next_version_ignores_preserve_history() {
        let store = Store::new();
        assert!(!store.preserve_history());

        store.set_item_at_next_version("Router", json!({"url": "/a"}));
        store.set_item_at_next_version("Router", json!({"url": "/b"}));
        assert_eq!(store.version_count(), 2);

        // new versions carry forward all keys of the previous version
        store.set_item("person", json!({"id": 1}));
        store.set_item_at_next_version("Router", json!({"url": "/c"}));
        assert_eq!(store.version_count(), 3);
        assert_eq!(store.get_item("person").unwrap().value, json!({"id": 1}));
    }

    #[test]
    fn test_get_item_missing_key_and_empty_store() {
        let store = Store::new();
        assert!(store.get_item("a").is_none());
        assert!(store.get_items().is_none());
        assert!(store.get_keys().is_none());

        store.set_item("a", json!(1));
        assert!(store.get_item("b").is_none());
    }

    #[test]
    fn test_out_of_range_version_resolves_to_latest() {
        let store = Store::new();
        store.set_preserve_history(true);
        store.set_item("a", json!(1));
        store.set_item("a", json!(2));

        assert_eq!(store.get_item_at("a", 99).unwrap().value, json!(2));
    }

    #[test]
    fn test_find_latest_matching_version_number() {
        let store = Store::new();
        assert_eq!(
            store.find_latest_matching_version_number("a", |_| true),
            None
        );

        store.set_preserve_history(true);
        store.set_item("a", json!(1));
        store.set_item("a", json!(2));
        store.set_item("a", json!(1));
        store.set_item("b", json!(0));

        // highest index wins
        assert_eq!(
            store.find_latest_matching_version_number("a", |item| item.value == json!(1)),
            Some(3)
        );
        assert_eq!(
            store.find_latest_matching_version_number("a", |item| item.value == json!(2)),
            Some(1)
        );
        assert_eq!(
            store.find_latest_matching_version_number("a", |item| item.value == json!(7)),
            None
        );
        // key never set at all
        assert_eq!(
            store.find_latest_matching_version_number("missing", |_| true),
            None
        );
    }

    #[test]
    fn test_predicate_skipped_for_versions_without_key() {
        let store = Store::new();
        store.set_item_at_next_version("Router", json!({"url": "/a"}));
        store.set_item_at_next_version("other", json!(1));

        let probed = Arc::new(Mutex::new(0usize));
        {
            let probed = Arc::clone(&probed);
            store.find_latest_matching_version_number("only-in-none", move |_| {
                *probed.lock() += 1;
                true
            });
        }
        assert_eq!(*probed.lock(), 0);
    }

    #[test]
    fn test_rewind_returns_excluded_suffix_oldest_first() {
        let store = Store::new();
        for n in 0..5 {
            store.set_item_at_next_version("a", json!(n));
        }

        let excluded = store.rewind_to_version(2).unwrap();
        assert_eq!(store.version_count(), 3);
        assert_eq!(excluded.len(), 2);
        assert_eq!(excluded[0].number, VersionNumber(3));
        assert_eq!(excluded[1].number, VersionNumber(4));
        assert_eq!(store.get_item("a").unwrap().value, json!(2));
    }

    #[test]
    fn test_rewind_out_of_range_is_an_argument_error() {
        let store = Store::new();

        // empty store has no in-range version
        assert!(matches!(
            store.rewind_to_version(0),
            Err(RetraceError::InvalidArgument(_))
        ));

        store.set_item("a", json!(1));
        assert!(matches!(
            store.rewind_to_version(1),
            Err(RetraceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rewind_then_replay_restores_history() {
        let store = Store::new();
        for n in 0..4 {
            store.set_item_at_next_version("a", json!(n));
        }
        let before: Vec<_> = (0..4)
            .map(|v| store.get_item_at("a", v).unwrap().value.clone())
            .collect();

        let excluded = store.rewind_to_version(1).unwrap();
        for version in excluded {
            store.append_version(version);
        }

        assert_eq!(store.version_count(), 4);
        for (v, expected) in before.iter().enumerate() {
            assert_eq!(&store.get_item_at("a", v).unwrap().value, expected);
            assert_eq!(
                store.get_items_at(v).unwrap()["a"].value,
                *expected
            );
        }
    }

    #[test]
    fn test_subscriber_sees_exactly_one_notification_per_set() {
        let store = Store::new();
        let seen: Arc<Mutex<Vec<StoreItem>>> = Arc::new(Mutex::new(Vec::new()));

        let subscriber = {
            let seen = Arc::clone(&seen);
            store.subscribe("person", move |item, _| seen.lock().push(item.clone()))
        };

        store.set_item("person", json!({"id": 42}));
        store.set_item("unrelated", json!(0));
        {
            let seen = seen.lock();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].key, "person");
            assert_eq!(seen[0].value, json!({"id": 42}));
        }

        subscriber.unsubscribe();
        store.set_item("person", json!({"id": 43}));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_subscribe_bound_passes_context() {
        struct Counter {
            hits: Mutex<usize>,
        }

        let store = Store::new();
        let counter = Arc::new(Counter {
            hits: Mutex::new(0),
        });

        store.subscribe_bound("person", Arc::clone(&counter), |ctx, item, _| {
            assert_eq!(item.key, "person");
            *ctx.hits.lock() += 1;
        });

        store.set_item("person", json!(1));
        store.set_item("person", json!(2));
        assert_eq!(*counter.hits.lock(), 2);
    }

    #[test]
    fn test_reentrant_set_item_from_callback() {
        let store = Store::new();
        let inner_seen = Arc::new(Mutex::new(Vec::new()));

        {
            let inner_seen = Arc::clone(&inner_seen);
            store.subscribe("derived", move |item, _| {
                inner_seen.lock().push(item.value.clone());
            });
        }
        {
            let store_again = Arc::clone(&store);
            store.subscribe("source", move |item, _| {
                // depth-first: this lands before the outer set_item returns
                store_again.set_item("derived", json!(item.value.as_i64().unwrap_or(0) * 2));
            });
        }

        store.set_item("source", json!(21));
        assert_eq!(*inner_seen.lock(), vec![json!(42)]);
    }

    #[test]
    fn test_send_notifications_for_current_version() {
        let store = Store::new();

        // empty store is a no-op
        store.send_notifications_for_current_version(&NotificationOptions::routing());

        store.set_item("a", json!(1));
        store.set_item("b", json!(2));

        let seen = Arc::new(Mutex::new(Vec::new()));
        for key in ["a", "b"] {
            let seen = Arc::clone(&seen);
            store.subscribe(key, move |item, options| {
                seen.lock().push((item.key.clone(), options.is_routing));
            });
        }

        store.send_notifications_for_current_version(&NotificationOptions::routing());

        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![("a".to_string(), true), ("b".to_string(), true)]
        );
    }

    #[test]
    fn test_in_place_extension_does_not_corrupt_history() {
        let store = Store::new();

        store.set_preserve_history(true);
        store.set_item("a", json!("old"));
        store.set_preserve_history(false);

        // in-place writes must not leak into the frozen version 0
        store.set_item_at_next_version("Router", json!({"url": "/x"}));
        store.set_item("a", json!("new"));

        assert_eq!(store.get_item_at("a", 0).unwrap().value, json!("old"));
        assert_eq!(store.get_item("a").unwrap().value, json!("new"));
    }
}
