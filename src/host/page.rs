//! In-memory document model

use std::sync::Arc;

use super::Page;
use crate::cache::ExpiringCache;
use crate::capabilities::CompatibilityReport;

/// A `<style>` node in the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNode {
    pub id: String,
    pub css: String,
}

/// Minimal document: body class list, head style nodes, and the two global
/// slots the engine writes
#[derive(Debug, Default)]
pub struct MemoryPage {
    body_classes: Vec<String>,
    head_styles: Vec<StyleNode>,
    /// Ids of non-style elements already present in the document
    element_ids: Vec<String>,
    report: Option<Arc<CompatibilityReport>>,
    cache_shim: Option<Arc<ExpiringCache>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the document with an element id owned by someone else
    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.element_ids.push(id.into());
        self
    }

    pub fn body_classes(&self) -> &[String] {
        &self.body_classes
    }

    /// Value of the body's `class` attribute
    pub fn class_attribute(&self) -> String {
        self.body_classes.join(" ")
    }

    pub fn head_styles(&self) -> &[StyleNode] {
        &self.head_styles
    }

    pub fn style(&self, id: &str) -> Option<&StyleNode> {
        self.head_styles.iter().find(|s| s.id == id)
    }

    /// Number of elements carrying `id`; more than one means a duplicate
    pub fn count_id(&self, id: &str) -> usize {
        self.head_styles.iter().filter(|s| s.id == id).count()
            + self.element_ids.iter().filter(|e| *e == id).count()
    }
}

impl Page for MemoryPage {
    fn add_body_class(&mut self, class: &str) {
        if !self.body_has_class(class) {
            self.body_classes.push(class.to_string());
        }
    }

    fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.iter().any(|c| c == class)
    }

    fn element_exists(&self, id: &str) -> bool {
        self.count_id(id) > 0
    }

    fn append_head_style(&mut self, id: &str, css: &str) {
        self.head_styles.push(StyleNode {
            id: id.to_string(),
            css: css.to_string(),
        });
    }

    fn publish_report(&mut self, report: Arc<CompatibilityReport>) {
        self.report = Some(report);
    }

    fn published_report(&self) -> Option<Arc<CompatibilityReport>> {
        self.report.clone()
    }

    fn publish_cache_shim(&mut self, cache: Arc<ExpiringCache>) {
        self.cache_shim = Some(cache);
    }

    fn cache_shim(&self) -> Option<Arc<ExpiringCache>> {
        self.cache_shim.clone()
    }
}
