//! # Retrace
//!
//! A client-side application framework built around a versioned, rewindable
//! reactive store.
//!
//! ## Core Concepts
//!
//! - **Store**: an ordered sequence of immutable versions, each a snapshot
//!   of key → item bindings; supports rewind (browser "back") and replay
//!   (browser "forward")
//! - **Subscriptions**: synchronous per-key change notifications
//! - **Router**: reconciles browser navigation against version history
//! - **Components**: route-bound render dispatch over boundary traits
//!
//! ## Example
//!
//! ```ignore
//! use retrace::{App, AppConfig, ComponentHost};
//! use serde_json::json;
//!
//! let app = App::new(AppConfig {
//!     history: browser_history,
//!     transport: fetch_transport,
//!     preserve_history: false,
//!     minimum_keyed_request_threshold: None,
//! });
//!
//! app.add_component(ComponentHost::new("/person/:id", person_view)?);
//! app.start("Home", "/");
//!
//! // application data flows through the store
//! app.store().set_item("person", json!({"id": 42}));
//! ```

pub mod app;
pub mod components;
pub mod error;
pub mod http;
pub mod router;
pub mod routes;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use app::{App, AppConfig};
pub use components::{
    ComponentHost, Control, MarkupSurface, Mode, NonVisualComponent, RenderHooks, TemplateEngine,
    TemplateViewComponent, ViewComponent,
};
pub use error::{HttpError, Result, RetraceError};
pub use http::{Http, HttpCallback, HttpRequest, HttpTransport, Method};
pub use router::{HistoryApi, Router, ROUTER_KEY};
pub use routes::{strip_origin, RoutePattern, RouteSegment};
pub use store::{Store, StoreObserver};
pub use subscriptions::{NotificationFn, Subscriber, SubscriberId, Subscription, SubscriptionManager};
pub use types::*;
