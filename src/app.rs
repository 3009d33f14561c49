//! Application wiring: one store, one router, one http helper.
//!
//! The original runtime hung these off an ambient global; here they are
//! explicitly constructed and dependency-injected, with a documented
//! single-instance-per-application convention.

use crate::components::ComponentHost;
use crate::http::{Http, HttpTransport};
use crate::router::{HistoryApi, Router};
use crate::store::Store;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for an application instance.
pub struct AppConfig {
    /// Browser history integration.
    pub history: Arc<dyn HistoryApi>,
    /// Network stack for [`Http`].
    pub transport: Arc<dyn HttpTransport>,
    /// Whether the store keeps a version per `set_item` call.
    pub preserve_history: bool,
    /// Optional GET-throttling window for keyed requests.
    pub minimum_keyed_request_threshold: Option<Duration>,
}

/// The assembled framework: store, router and http bound together.
pub struct App {
    store: Arc<Store>,
    router: Arc<Router>,
    http: Arc<Http>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let store = Store::new();
        store.set_preserve_history(config.preserve_history);

        let router = Router::new(Arc::clone(&store), config.history);

        let http = match config.minimum_keyed_request_threshold {
            Some(threshold) => Arc::new(Http::with_request_threshold(
                Arc::clone(&store),
                config.transport,
                threshold,
            )),
            None => Arc::new(Http::new(Arc::clone(&store), config.transport)),
        };

        Self {
            store,
            router,
            http,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// Registers a routable component with the router.
    pub fn add_component(&self, component: Arc<ComponentHost>) {
        self.router.add_component(component);
    }

    /// Call once the application has finished registering components and
    /// wants to actually start: records the initial navigation state.
    pub fn start(&self, title: &str, url: &str) {
        self.router.start(title, url);
    }
}
