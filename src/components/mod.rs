//! Route-bound components and render dispatch.
//!
//! Components bind a route pattern to a set of render hooks:
//! - [`RenderHooks`] is the dynamic-dispatch seam for rendering
//! - [`ComponentHost`] runs the Hidden/Rendered mode machine and isolates
//!   hook failures from routing dispatch
//! - [`ViewComponent`], [`TemplateViewComponent`] and
//!   [`NonVisualComponent`] are the stock hook implementations
//! - [`Control`] is a nestable template fragment
//!
//! Actual DOM manipulation and template substitution stay behind the
//! [`MarkupSurface`] and [`TemplateEngine`] boundary traits; this crate
//! never touches a real document.

mod base;
mod control;
mod nonvisual;
mod template;
mod view;

pub use base::{ComponentHost, Mode, RenderHooks};
pub use control::Control;
pub use nonvisual::NonVisualComponent;
pub use template::{TemplateEngine, TemplateViewComponent};
pub use view::{MarkupSurface, ViewComponent};
