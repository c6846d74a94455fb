//! Mime renderer registry
//!
//! Provides [`RendererRegistry`], a capability-dispatch table keyed by mime
//! type. The registry is generic over the renderer's output so the model
//! stays agnostic of whatever draw surface the host uses.
//!
//! Unknown mime types never fail: lookup falls back to the registry's
//! default renderer, and without one rendering simply yields nothing.

use crate::mime::{MimeBundle, MimeEntry, MimePayload};
use indexmap::IndexMap;
use std::sync::Arc;

/// Turns one mime entry into a visual representation
pub trait MimeRenderer<Out>: Send + Sync {
    /// Render an entry, or `None` if the payload cannot be shown
    fn render(&self, entry: &MimeEntry) -> Option<Out>;
}

impl<Out, F> MimeRenderer<Out> for F
where
    F: Fn(&MimeEntry) -> Option<Out> + Send + Sync,
{
    fn render(&self, entry: &MimeEntry) -> Option<Out> {
        self(entry)
    }
}

/// Renders text payloads as their joined string
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl MimeRenderer<String> for PlainTextRenderer {
    fn render(&self, entry: &MimeEntry) -> Option<String> {
        match entry.payload() {
            MimePayload::Text(_) => entry.payload().as_text(),
            MimePayload::Json(value) => serde_json::to_string_pretty(value).ok(),
            MimePayload::Binary(_) => None,
        }
    }
}

/// Registry of renderers keyed by mime type
///
/// Registration order is preference order: [`preferred_entry`](Self::preferred_entry)
/// picks the bundle entry whose mime type was registered first.
pub struct RendererRegistry<Out> {
    renderers: IndexMap<String, Arc<dyn MimeRenderer<Out>>>,
    fallback: Option<Arc<dyn MimeRenderer<Out>>>,
}

impl<Out> Default for RendererRegistry<Out> {
    fn default() -> Self {
        Self {
            renderers: IndexMap::new(),
            fallback: None,
        }
    }
}

impl<Out> std::fmt::Debug for RendererRegistry<Out> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("mime_types", &self.renderers.keys().collect::<Vec<_>>())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<Out> Clone for RendererRegistry<Out> {
    fn clone(&self) -> Self {
        Self {
            renderers: self.renderers.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<Out: 'static> RendererRegistry<Out> {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for a mime type
    ///
    /// Re-registering a mime type replaces the renderer but keeps its
    /// preference position.
    pub fn register<R>(&mut self, mime_type: &str, renderer: R)
    where
        R: MimeRenderer<Out> + 'static,
    {
        self.renderers
            .insert(mime_type.to_ascii_lowercase(), Arc::new(renderer));
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with<R>(mut self, mime_type: &str, renderer: R) -> Self
    where
        R: MimeRenderer<Out> + 'static,
    {
        self.register(mime_type, renderer);
        self
    }

    /// Set the renderer used for unsupported mime types
    #[must_use]
    pub fn with_fallback<R>(mut self, renderer: R) -> Self
    where
        R: MimeRenderer<Out> + 'static,
    {
        self.fallback = Some(Arc::new(renderer));
        self
    }

    /// Check if a dedicated renderer exists for a mime type
    #[inline]
    #[must_use]
    pub fn contains(&self, mime_type: &str) -> bool {
        self.renderers.contains_key(&mime_type.to_ascii_lowercase())
    }

    /// Renderer for a mime type, or the fallback
    #[must_use]
    pub fn renderer_for(&self, mime_type: &str) -> Option<Arc<dyn MimeRenderer<Out>>> {
        self.renderers
            .get(&mime_type.to_ascii_lowercase())
            .or(self.fallback.as_ref())
            .cloned()
    }

    /// Render a single entry
    #[must_use]
    pub fn render(&self, entry: &MimeEntry) -> Option<Out> {
        self.renderer_for(entry.mime_type())?.render(entry)
    }

    /// Entry of the bundle with the most preferred registered mime type
    #[must_use]
    pub fn preferred_entry<'a>(&self, bundle: &'a MimeBundle) -> Option<&'a MimeEntry> {
        self.renderers
            .keys()
            .find_map(|mime| bundle.iter().find(|e| e.mime_type().eq_ignore_ascii_case(mime)))
    }

    /// Render the preferred entry of a bundle
    ///
    /// Without a registered match the first entry goes to the fallback.
    #[must_use]
    pub fn render_bundle(&self, bundle: &MimeBundle) -> Option<Out> {
        match self.preferred_entry(bundle) {
            Some(entry) => self.render(entry),
            None => {
                let entry = bundle.iter().next()?;
                self.fallback.as_ref()?.render(entry)
            }
        }
    }

    /// Registered mime types in preference order
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    /// Number of registered renderers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl RendererRegistry<String> {
    /// Text-only registry: `text/plain` plus a text fallback
    #[must_use]
    pub fn text_only() -> Self {
        Self::new()
            .with("text/plain", PlainTextRenderer)
            .with_fallback(PlainTextRenderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> MimeBundle {
        MimeBundle::new()
            .with(MimeEntry::plain("plain"))
            .with(MimeEntry::new("text/html", MimePayload::text("<b>rich</b>")))
            .with(MimeEntry::new("image/png", MimePayload::Binary(vec![1])))
    }

    #[test]
    fn registration_order_is_preference() {
        let registry = RendererRegistry::<String>::new()
            .with("image/png", |_: &MimeEntry| Some("png".to_string()))
            .with("text/plain", PlainTextRenderer);

        let bundle = bundle();
        let entry = registry.preferred_entry(&bundle).unwrap();
        assert_eq!(entry.mime_type(), "image/png");
        assert_eq!(registry.render_bundle(&bundle).as_deref(), Some("png"));
    }

    #[test]
    fn unknown_mime_uses_fallback() {
        let registry = RendererRegistry::text_only();
        let entry = MimeEntry::new("text/markdown", MimePayload::text("*hi*"));
        assert!(!registry.contains("text/markdown"));
        assert_eq!(registry.render(&entry).as_deref(), Some("*hi*"));
    }

    #[test]
    fn unknown_mime_without_fallback_renders_nothing() {
        let registry = RendererRegistry::<String>::new().with("text/plain", PlainTextRenderer);
        let entry = MimeEntry::new("application/x-custom", MimePayload::text("x"));
        assert!(registry.renderer_for("application/x-custom").is_none());
        assert!(registry.render(&entry).is_none());
    }

    #[test]
    fn binary_payload_is_not_text_renderable() {
        let registry = RendererRegistry::text_only();
        let entry = MimeEntry::new("image/png", MimePayload::Binary(vec![0]));
        assert!(registry.render(&entry).is_none());
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = RendererRegistry::text_only();
        assert!(registry.contains("Text/Plain"));
        assert_eq!(registry.mime_types().collect::<Vec<_>>(), vec!["text/plain"]);
    }
}
