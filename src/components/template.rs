//! Template-driven visual component.

use crate::components::base::RenderHooks;
use crate::components::view::{MarkupSurface, ViewComponent};
use crate::error::{Result, RetraceError};
use crate::types::{NotificationOptions, StoreItem, UrlContext};
use parking_lot::RwLock;
use regex::{NoExpand, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Boundary for filling a template with data (a mustache-style engine in
/// the original stack). Substitution syntax is entirely the engine's
/// concern.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String>;
}

/// A visual component with a registry of named templates.
///
/// When constructed with a CSS localization map, every `class="name"`
/// occurrence in the templates is rewritten to the localized class name,
/// both quote styles, case-insensitively.
pub struct TemplateViewComponent {
    view: ViewComponent,
    engine: Arc<dyn TemplateEngine>,
    templates: RwLock<HashMap<String, String>>,
}

impl TemplateViewComponent {
    pub fn new(
        surface: Arc<dyn MarkupSurface>,
        engine: Arc<dyn TemplateEngine>,
        templates: HashMap<String, String>,
        local_css: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let templates = match local_css {
            Some(css) => templates
                .into_iter()
                .map(|(name, content)| Ok((name, localize_css(&content, css)?)))
                .collect::<Result<HashMap<_, _>>>()?,
            None => templates,
        };
        Ok(Self {
            view: ViewComponent::new(surface),
            engine,
            templates: RwLock::new(templates),
        })
    }

    pub fn add_template(&self, name: &str, content: &str) {
        self.templates
            .write()
            .insert(name.to_string(), content.to_string());
    }

    pub fn remove_template(&self, name: &str) {
        self.templates.write().remove(name);
    }

    /// Fills the named template with `data`.
    pub fn render_template(&self, name: &str, data: &Value) -> Result<String> {
        let templates = self.templates.read();
        let template = templates
            .get(name)
            .ok_or_else(|| RetraceError::TemplateNotFound(name.to_string()))?;
        self.engine.render(template, data)
    }

    /// Applies markup to the component's surface.
    pub fn update_dom(&self, markup: &str) -> Result<()> {
        self.view.update_dom(markup)
    }
}

impl RenderHooks for TemplateViewComponent {
    fn render_route(&self, ctxt: &UrlContext) -> Result<()> {
        self.view.render_route(ctxt)
    }

    fn render_notification(&self, item: &StoreItem, options: &NotificationOptions) -> Result<()> {
        self.view.render_notification(item, options)
    }

    fn hide(&self) -> Result<()> {
        self.view.hide()
    }
}

/// Rewrites `class` attributes from the original class names to their
/// localized counterparts.
pub(crate) fn localize_css(content: &str, local_css: &HashMap<String, String>) -> Result<String> {
    let mut content = content.to_string();
    for (original, localized) in local_css {
        let escaped = regex::escape(original);
        for (open, close) in [('"', '"'), ('\'', '\'')] {
            let pattern = format!("(?i)class={open}{escaped}{close}");
            let matcher = Regex::new(&pattern)
                .map_err(|e| RetraceError::InvalidArgument(e.to_string()))?;
            let replacement = format!("class={open}{localized}{close}");
            content = matcher
                .replace_all(&content, NoExpand(&replacement))
                .into_owned();
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullSurface;
    impl MarkupSurface for NullSurface {
        fn apply_markup(&self, _markup: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Replaces `{key}` placeholders with string values from the data object.
    struct BraceEngine;
    impl TemplateEngine for BraceEngine {
        fn render(&self, template: &str, data: &Value) -> Result<String> {
            let mut out = template.to_string();
            if let Some(object) = data.as_object() {
                for (key, value) in object {
                    let needle = format!("{{{key}}}");
                    let text = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                    out = out.replace(&needle, &text);
                }
            }
            Ok(out)
        }
    }

    fn component(templates: HashMap<String, String>) -> TemplateViewComponent {
        TemplateViewComponent::new(Arc::new(NullSurface), Arc::new(BraceEngine), templates, None)
            .unwrap()
    }

    #[test]
    fn test_render_named_template() {
        let component = component(HashMap::from([(
            "greeting".to_string(),
            "Hello, {name}!".to_string(),
        )]));

        let markup = component
            .render_template("greeting", &json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(markup, "Hello, Ada!");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let component = component(HashMap::new());
        assert!(matches!(
            component.render_template("absent", &json!({})),
            Err(RetraceError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_add_and_remove_template() {
        let component = component(HashMap::new());
        component.add_template("row", "<li>{item}</li>");
        assert_eq!(
            component.render_template("row", &json!({"item": "x"})).unwrap(),
            "<li>x</li>"
        );

        component.remove_template("row");
        assert!(component.render_template("row", &json!({})).is_err());
    }

    #[test]
    fn test_css_localization_rewrites_both_quote_styles() {
        let css = HashMap::from([("card".to_string(), "card-9f2".to_string())]);
        let content = r#"<div class="card"><span class='CARD'>x</span></div>"#;

        let localized = localize_css(content, &css).unwrap();
        assert_eq!(
            localized,
            r#"<div class="card-9f2"><span class='card-9f2'>x</span></div>"#
        );
    }

    #[test]
    fn test_localization_applied_to_constructor_templates() {
        let css = HashMap::from([("a".to_string(), "a-local".to_string())]);
        let component = TemplateViewComponent::new(
            Arc::new(NullSurface),
            Arc::new(BraceEngine),
            HashMap::from([("t".to_string(), r#"<p class="a">{x}</p>"#.to_string())]),
            Some(&css),
        )
        .unwrap();

        assert_eq!(
            component.render_template("t", &json!({"x": "1"})).unwrap(),
            r#"<p class="a-local">1</p>"#
        );
    }
}
