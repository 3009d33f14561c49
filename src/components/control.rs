//! Nestable template fragments.

use crate::components::template::{localize_css, TemplateEngine};
use crate::components::view::MarkupSurface;
use crate::error::{Result, RetraceError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A reusable template fragment that can nest other controls.
///
/// Sub-control output is substituted into the parent's rendered content in
/// a second engine pass, keyed by control id.
pub struct Control {
    id: String,
    template: String,
    engine: Arc<dyn TemplateEngine>,
    controls: RwLock<HashMap<String, Arc<Control>>>,
}

impl Control {
    pub fn new(
        id: &str,
        template: &str,
        engine: Arc<dyn TemplateEngine>,
        local_css: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        if id.is_empty() {
            return Err(RetraceError::InvalidArgument(
                "cannot create the control because the id is empty".to_string(),
            ));
        }
        let template = match local_css {
            Some(css) => localize_css(template, css)?,
            None => template.to_string(),
        };
        Ok(Self {
            id: id.to_string(),
            template,
            engine,
            controls: RwLock::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Registers a sub-control, replacing any previous one with the same id.
    pub fn add_control(&self, control: Arc<Control>) {
        self.controls
            .write()
            .insert(control.id().to_string(), control);
    }

    pub fn remove_control(&self, id: &str) {
        self.controls.write().remove(id);
    }

    /// Renders the control's template with `data`, then substitutes the
    /// rendered sub-controls in a second pass.
    pub fn render(&self, data: &Value) -> Result<String> {
        let mut content = self.engine.render(&self.template, data)?;

        let controls = self.controls.read();
        if !controls.is_empty() {
            let mut rendered = serde_json::Map::new();
            for (id, control) in controls.iter() {
                rendered.insert(id.clone(), Value::String(control.render(data)?));
            }
            content = self.engine.render(&content, &Value::Object(rendered))?;
        }
        Ok(content)
    }

    /// Invoked after the host surface has been updated so event bindings
    /// can be re-established; cascades through nested controls.
    pub fn on_dom_updated(&self, surface: &Arc<dyn MarkupSurface>) {
        for control in self.controls.read().values() {
            control.on_dom_updated(surface);
        }
    }
}
