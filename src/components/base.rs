//! Component host: the Hidden/Rendered mode machine.

use crate::error::{Result, RetraceError};
use crate::routes::{strip_origin, RoutePattern};
use crate::store::Store;
use crate::subscriptions::Subscriber;
use crate::types::{ComponentEvent, NotificationOptions, StoreItem, UrlContext};
use parking_lot::Mutex;
use std::sync::Arc;

/// Render lifecycle hooks, implemented by each component variant.
///
/// The default bodies surface `NotImplemented` through the host's error
/// boundary, so a variant that skips a hook it is expected to provide is
/// logged rather than silently ignored.
pub trait RenderHooks: Send + Sync {
    /// Set up content for a freshly matched route (static boilerplate).
    fn render_route(&self, _ctxt: &UrlContext) -> Result<()> {
        Err(RetraceError::NotImplemented("render_route"))
    }

    /// Render actual data after a store notification.
    fn render_notification(
        &self,
        _item: &StoreItem,
        _options: &NotificationOptions,
    ) -> Result<()> {
        Err(RetraceError::NotImplemented("render_notification"))
    }

    /// Tear down visible content when the route stops matching.
    fn hide(&self) -> Result<()> {
        Err(RetraceError::NotImplemented("hide"))
    }
}

/// Whether a component currently has rendered content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Hidden,
    Rendered,
}

/// Binds a route pattern to render hooks and tracks render state.
///
/// Hook errors are caught here and logged: a failing component must not
/// block routing dispatch to other components.
pub struct ComponentHost {
    route: RoutePattern,
    hooks: Box<dyn RenderHooks>,
    mode: Mutex<Mode>,
    last_event: Mutex<Option<ComponentEvent>>,
}

impl ComponentHost {
    /// Binds `hooks` to the route template `route_url`.
    pub fn new(route_url: &str, hooks: impl RenderHooks + 'static) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            route: RoutePattern::parse(route_url)?,
            hooks: Box::new(hooks),
            mode: Mutex::new(Mode::Hidden),
            last_event: Mutex::new(None),
        }))
    }

    pub fn route(&self) -> &RoutePattern {
        &self.route
    }

    pub fn mode(&self) -> Mode {
        *self.mode.lock()
    }

    /// The last event dispatched to this component's hooks, if any.
    pub fn last_event(&self) -> Option<ComponentEvent> {
        self.last_event.lock().clone()
    }

    /// Route dispatch. A matching url renders the component once
    /// (Hidden → Rendered); a non-matching url hides it once
    /// (Rendered → Hidden). Repeat dispatches in the same mode are no-ops.
    pub fn on_url_changed(&self, url: &str) {
        let url = strip_origin(url);
        match self.route.match_url(url) {
            Some(params) => {
                if self.mode() == Mode::Rendered {
                    return;
                }
                let ctxt = UrlContext::new(url, params);
                *self.last_event.lock() = Some(ComponentEvent::RouteChanged(ctxt.clone()));
                match self.hooks.render_route(&ctxt) {
                    // mode flips only after a successful render
                    Ok(()) => *self.mode.lock() = Mode::Rendered,
                    Err(error) => {
                        tracing::error!(%error, url, route = self.route.route_url(), "route render failed");
                    }
                }
            }
            None => {
                if self.mode() != Mode::Rendered {
                    return;
                }
                if let Err(error) = self.hooks.hide() {
                    tracing::error!(%error, route = self.route.route_url(), "hide failed");
                }
                // hidden regardless, so the mode machine cannot wedge
                *self.mode.lock() = Mode::Hidden;
            }
        }
    }

    /// Subscribes this component to a store key. Notifications render only
    /// while the component is in Rendered mode; the subscription holds the
    /// host weakly so a dropped component stops rendering.
    pub fn subscribe(self: &Arc<Self>, store: &Store, key: &str) -> Arc<Subscriber> {
        let host = Arc::downgrade(self);
        store.subscribe(key, move |item, options| {
            let Some(host) = host.upgrade() else {
                return;
            };
            if host.mode() != Mode::Rendered {
                return;
            }
            *host.last_event.lock() = Some(ComponentEvent::Notification(item.clone()));
            if let Err(error) = host.hooks.render_notification(item, options) {
                tracing::error!(%error, key = %item.key, "notification render failed");
            }
        })
    }
}
