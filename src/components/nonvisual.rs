//! Component with routing behavior but no visual output.

use crate::components::base::RenderHooks;
use crate::error::Result;
use crate::types::{NotificationOptions, StoreItem, UrlContext};

/// A route-bound component that produces no markup. Useful for side-effect
/// work that should follow the routing lifecycle (prefetching, analytics).
#[derive(Debug, Default)]
pub struct NonVisualComponent;

impl NonVisualComponent {
    pub fn new() -> Self {
        Self
    }
}

impl RenderHooks for NonVisualComponent {
    fn render_route(&self, ctxt: &UrlContext) -> Result<()> {
        tracing::debug!(url = %ctxt.url, "non-visual component route render");
        Ok(())
    }

    fn render_notification(&self, item: &StoreItem, _options: &NotificationOptions) -> Result<()> {
        tracing::debug!(key = %item.key, "non-visual component notification render");
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        Ok(())
    }
}
