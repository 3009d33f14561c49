//! Visual component rendering markup into a surface.

use crate::components::base::RenderHooks;
use crate::error::Result;
use crate::types::{NotificationOptions, StoreItem, UrlContext};
use std::sync::Arc;

/// Boundary for applying rendered markup to a concrete surface (a DOM
/// container element in a browser embedding). Rendering and diffing are
/// entirely the embedder's concern.
pub trait MarkupSurface: Send + Sync {
    fn apply_markup(&self, markup: &str) -> Result<()>;
}

/// A visual component bound to a markup surface.
///
/// The stock hook implementations only trace; applications layer their own
/// rendering on top via [`ViewComponent::update_dom`].
pub struct ViewComponent {
    surface: Arc<dyn MarkupSurface>,
}

impl ViewComponent {
    pub fn new(surface: Arc<dyn MarkupSurface>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &Arc<dyn MarkupSurface> {
        &self.surface
    }

    /// Applies markup to the component's surface.
    pub fn update_dom(&self, markup: &str) -> Result<()> {
        self.surface.apply_markup(markup)
    }
}

impl RenderHooks for ViewComponent {
    fn render_route(&self, ctxt: &UrlContext) -> Result<()> {
        tracing::debug!(url = %ctxt.url, "view component route render");
        Ok(())
    }

    fn render_notification(&self, item: &StoreItem, _options: &NotificationOptions) -> Result<()> {
        tracing::debug!(key = %item.key, "view component notification render");
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        tracing::debug!("view component hidden");
        Ok(())
    }
}
