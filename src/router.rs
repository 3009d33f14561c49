//! Navigation reconciliation against the store's version history.
//!
//! Browser history is a linear back/forward stack. The store models "back"
//! as truncation of its version list and "forward" as re-appending the
//! truncated versions. Only the router's own key participates in that
//! replay: any other state change invalidates the forward buffer, because
//! replaying old router versions would resurrect stale application data
//! alongside them.

use crate::components::ComponentHost;
use crate::error::Result;
use crate::store::{Store, StoreObserver};
use crate::types::{NavigationState, NotificationOptions, StoreItem, Version};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// The store key under which navigation state is versioned.
pub const ROUTER_KEY: &str = "Router";

/// Browser history integration boundary.
///
/// The embedder mirrors navigation state into the native history stack
/// (`history.pushState`/`replaceState` in a browser embedding) and feeds
/// popstate payloads back through [`Router::handle_pop_state`].
pub trait HistoryApi: Send + Sync {
    fn push_state(&self, state: &NavigationState);
    fn replace_state(&self, state: &NavigationState);
}

/// Reconciles navigation events with the store's version history and
/// drives component re-rendering.
///
/// Bound one-to-one with its store: construction registers the router as
/// the store's observer so every set operation reports back here.
pub struct Router {
    store: Arc<Store>,
    history: Arc<dyn HistoryApi>,

    /// Routable components, dispatched to on every url change.
    components: RwLock<Vec<Arc<ComponentHost>>>,

    /// Previously truncated versions retained for forward replay, oldest
    /// first.
    forward_versions: Mutex<Vec<Version>>,
}

impl Router {
    pub fn new(store: Arc<Store>, history: Arc<dyn HistoryApi>) -> Arc<Self> {
        let router = Arc::new(Self {
            store,
            history,
            components: RwLock::new(Vec::new()),
            forward_versions: Mutex::new(Vec::new()),
        });
        let observer: Weak<dyn StoreObserver> =
            Arc::downgrade(&(router.clone() as Arc<dyn StoreObserver>));
        router.store.set_observer(observer);
        router
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Records the initial navigation state so it can be revisited later.
    /// Call once the application has finished registering components.
    pub fn start(&self, title: &str, url: &str) {
        let state = NavigationState::init(title, url);
        self.history.replace_state(&state);
    }

    /// Models an anchor-element click: reconciles the new state, then adds
    /// an entry to the browser history stack.
    pub fn navigate(&self, title: &str, url: &str) -> Result<()> {
        let state = NavigationState::clicked(title, url);
        self.on_state_changed(state.clone())?;
        self.history.push_state(&state);
        Ok(())
    }

    /// Feeds a browser back/forward (popstate) payload into reconciliation.
    pub fn handle_pop_state(&self, mut state: NavigationState) -> Result<()> {
        state.is_pop_state = true;
        self.on_state_changed(state)
    }

    /// Adds a routable component. Adding the same component twice is a
    /// no-op.
    pub fn add_component(&self, component: Arc<ComponentHost>) {
        let mut components = self.components.write();
        if !components
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &component))
        {
            components.push(component);
        }
    }

    pub fn component_count(&self) -> usize {
        self.components.read().len()
    }

    /// Number of truncated versions currently retained for forward replay.
    pub fn forward_version_count(&self) -> usize {
        self.forward_versions.lock().len()
    }

    /// Index of the retained forward version whose router entry matches
    /// `url`, if any.
    pub fn find_forward_version_index_with_route(&self, url: &str) -> Option<usize> {
        Self::find_forward_index(&self.forward_versions.lock(), url)
    }

    /// The reconciliation state machine.
    ///
    /// Routable components hear about the url first, unconditionally. A
    /// non-pop state is a fresh navigation and always appends a new router
    /// version. A pop state is matched against the version history (back)
    /// and then against the forward buffer (forward); an unmatched pop is
    /// treated as a genuinely new route.
    pub fn on_state_changed(&self, new_state: NavigationState) -> Result<()> {
        tracing::debug!(
            url = %new_state.url,
            origin = ?new_state.origin,
            is_pop_state = new_state.is_pop_state,
            "navigation state changed"
        );

        let components: Vec<Arc<ComponentHost>> = self.components.read().clone();
        for component in &components {
            component.on_url_changed(&new_state.url);
        }

        if new_state.is_pop_state {
            self.reconcile_pop_state(new_state)
        } else {
            self.push_new_route(new_state)
        }
    }

    fn push_new_route(&self, state: NavigationState) -> Result<()> {
        let value = serde_json::to_value(&state)?;
        self.store.set_item_at_next_version(ROUTER_KEY, value);
        self.store
            .send_notifications_for_current_version(&NotificationOptions::routing());
        Ok(())
    }

    fn reconcile_pop_state(&self, state: NavigationState) -> Result<()> {
        let target = self
            .store
            .find_latest_matching_version_number(ROUTER_KEY, |item| {
                Self::route_url(item) == Some(state.url.as_str())
            });

        if let Some(version) = target {
            // Back navigation: truncate, keeping the tail for forward
            // replay. Rewind notifications run before the buffer is
            // updated, so a subscriber that writes application data during
            // them still invalidates only the previously retained tail.
            let excluded = self.store.rewind_to_version(version)?;
            let mut forward = self.forward_versions.lock();
            let tail = std::mem::take(&mut *forward);
            *forward = excluded;
            forward.extend(tail);
            return Ok(());
        }

        // Forward navigation: replay retained versions through the matching
        // url, in order, exactly as they were.
        let replayable: Vec<Version> = {
            let mut forward = self.forward_versions.lock();
            match Self::find_forward_index(&forward, &state.url) {
                Some(index) => forward.drain(..=index).collect(),
                None => Vec::new(),
            }
        };

        if replayable.is_empty() {
            // Unknown to both the history and the buffer: a new route.
            let value = serde_json::to_value(&state)?;
            self.store.set_item_at_next_version(ROUTER_KEY, value);
        } else {
            for version in replayable {
                self.store.append_version(version);
            }
        }
        self.store
            .send_notifications_for_current_version(&NotificationOptions::routing());
        Ok(())
    }

    fn find_forward_index(forward: &[Version], url: &str) -> Option<usize> {
        forward.iter().position(|version| {
            version
                .get(ROUTER_KEY)
                .is_some_and(|item| Self::route_url(item) == Some(url))
        })
    }

    fn route_url(item: &StoreItem) -> Option<&str> {
        item.value.get("url").and_then(Value::as_str)
    }
}

impl StoreObserver for Router {
    /// Any non-routing change invalidates the forward replay buffer.
    fn on_set_item(&self, item: &StoreItem) {
        if item.key == ROUTER_KEY {
            return;
        }
        let mut forward = self.forward_versions.lock();
        if !forward.is_empty() {
            tracing::debug!(
                key = %item.key,
                dropped = forward.len(),
                "forward navigation buffer invalidated"
            );
            forward.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavigationOrigin;
    use serde_json::json;

    struct NullHistory;

    impl HistoryApi for NullHistory {
        fn push_state(&self, _state: &NavigationState) {}
        fn replace_state(&self, _state: &NavigationState) {}
    }

    fn test_router() -> Arc<Router> {
        Router::new(Store::new(), Arc::new(NullHistory))
    }

    fn stored_url(store: &Store) -> String {
        store.get_item(ROUTER_KEY).unwrap().value["url"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_fresh_navigation_appends_router_version() {
        let router = test_router();

        router.navigate("A", "/a").unwrap();
        router.navigate("B", "/b").unwrap();

        let store = router.store();
        assert_eq!(store.version_count(), 2);
        assert_eq!(stored_url(store), "/b");
    }

    #[test]
    fn test_back_rewinds_and_retains_forward_versions() {
        let router = test_router();
        router.navigate("A", "/a").unwrap();
        router.navigate("B", "/b").unwrap();

        let original_a = router.store().get_item_at(ROUTER_KEY, 0).unwrap();

        router
            .handle_pop_state(NavigationState::clicked("A", "/a"))
            .unwrap();

        let store = router.store();
        assert_eq!(store.version_count(), 1);
        // identical value at A as originally stored
        assert_eq!(store.get_item(ROUTER_KEY).unwrap().value, original_a.value);
        // B is retained for a subsequent forward navigation
        assert_eq!(router.forward_version_count(), 1);
        assert_eq!(router.find_forward_version_index_with_route("/b"), Some(0));
    }

    #[test]
    fn test_forward_replays_retained_versions() {
        let router = test_router();
        router.navigate("A", "/a").unwrap();
        router.navigate("B", "/b").unwrap();
        router.navigate("C", "/c").unwrap();

        router
            .handle_pop_state(NavigationState::clicked("A", "/a"))
            .unwrap();
        assert_eq!(router.forward_version_count(), 2);

        router
            .handle_pop_state(NavigationState::clicked("C", "/c"))
            .unwrap();

        let store = router.store();
        assert_eq!(store.version_count(), 3);
        assert_eq!(stored_url(store), "/c");
        assert_eq!(router.forward_version_count(), 0);
    }

    #[test]
    fn test_unknown_pop_state_is_a_new_route() {
        let router = test_router();
        router.navigate("A", "/a").unwrap();

        router
            .handle_pop_state(NavigationState::clicked("Z", "/z"))
            .unwrap();

        let store = router.store();
        assert_eq!(store.version_count(), 2);
        assert_eq!(stored_url(store), "/z");
        let stored: NavigationState =
            serde_json::from_value(store.get_item(ROUTER_KEY).unwrap().value.clone()).unwrap();
        assert_eq!(stored.origin, NavigationOrigin::Clicked);
        assert!(stored.is_pop_state);
    }

    #[test]
    fn test_non_router_set_invalidates_forward_buffer() {
        let router = test_router();
        router.navigate("A", "/a").unwrap();
        router.navigate("B", "/b").unwrap();
        router
            .handle_pop_state(NavigationState::clicked("A", "/a"))
            .unwrap();
        assert_eq!(router.forward_version_count(), 1);

        router.store().set_item("person", json!({"id": 1}));
        assert_eq!(router.forward_version_count(), 0);

        // forward to /b no longer replays; it becomes a new route
        router
            .handle_pop_state(NavigationState::clicked("B", "/b"))
            .unwrap();
        assert_eq!(stored_url(router.store()), "/b");
    }

    #[test]
    fn test_add_component_deduplicates() {
        use crate::components::NonVisualComponent;

        let router = test_router();
        let component = ComponentHost::new("/a", NonVisualComponent::new()).unwrap();

        router.add_component(Arc::clone(&component));
        router.add_component(component);
        assert_eq!(router.component_count(), 1);
    }
}
