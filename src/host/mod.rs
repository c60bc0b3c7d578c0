//! Host abstraction
//!
//! The engine never touches a real browser directly. Probes read the
//! [`BrowserEnvironment`], fallbacks write to the [`Page`]. Embedders bind
//! these traits to a live DOM; the in-memory implementations here back the
//! CLI and the test suite.

mod clock;
mod environment;
mod page;

use std::sync::Arc;

pub use clock::{Clock, ManualClock, SystemClock};
pub use environment::{
    CssDeclaration, EnvironmentProfile, LocalStorageMode, StaticEnvironment, MODERN_USER_AGENT,
};
pub use page::{MemoryPage, StyleNode};

use crate::cache::{ExpiringCache, Storage};
use crate::capabilities::{CompatibilityReport, ProbeError};

/// Read-only view of the browser that probes consult
pub trait BrowserEnvironment: Send + Sync {
    /// Raw user-agent string
    fn user_agent(&self) -> &str;

    /// Whether the style engine accepts `value` for `property`
    ///
    /// Errors when the style engine cannot be queried at all.
    fn css_supports(&self, property: &str, value: &str) -> Result<bool, ProbeError>;

    /// Whether a well-known symbol (e.g. `iterator`) is defined
    fn has_symbol(&self, name: &str) -> bool;

    /// Whether a zero-argument async function returns a promise-like
    fn async_function_returns_promise(&self) -> Result<bool, ProbeError>;

    /// Whether `name` is present in the ambient global scope
    fn has_global(&self, name: &str) -> bool;

    /// Whether `name` is present on the user-agent info (navigator) object
    fn navigator_has(&self, name: &str) -> bool;

    /// Synchronous persistence surface, `None` when the browser has none
    fn local_storage(&self) -> Option<Arc<dyn Storage>>;
}

/// Mutable document and global scope that fallbacks install into
pub trait Page: Send {
    /// Add `class` to the body class list; set semantics
    fn add_body_class(&mut self, class: &str);

    fn body_has_class(&self, class: &str) -> bool;

    /// Whether any element in the document carries `id`
    fn element_exists(&self, id: &str) -> bool;

    /// Append a `<style id=...>` node to the head
    fn append_head_style(&mut self, id: &str, css: &str);

    /// Publish the compatibility report on its well-known global
    fn publish_report(&mut self, report: Arc<CompatibilityReport>);

    fn published_report(&self) -> Option<Arc<CompatibilityReport>>;

    /// Publish the cache shim on its well-known global
    fn publish_cache_shim(&mut self, cache: Arc<ExpiringCache>);

    fn cache_shim(&self) -> Option<Arc<ExpiringCache>>;
}
