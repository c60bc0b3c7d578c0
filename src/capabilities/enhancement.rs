//! Enhancement mapping
//!
//! Pure translation from probe results to the fallback actions that paper
//! over missing features. The table is fixed; a key without an entry maps to
//! nothing.

use serde::{Deserialize, Serialize};

use crate::capabilities::state::ResultMap;

pub const COLOR_MIX_FALLBACK_ID: &str = "color-mix-fallback";

pub const COLOR_MIX_FALLBACK_CSS: &str = concat!(
    ".no-color-mix .repo-card { background: rgba(var(--card-bg-rgb), 0.95) !important; }\n",
    ".no-color-mix .highlight-box { background: rgba(255, 255, 255, 0.95) !important; }\n",
    "[data-theme=\"dark\"] .no-color-mix .highlight-box { background: rgba(26, 26, 26, 0.95) !important; }\n",
    ".no-color-mix [style*=\"color-mix\"] { opacity: 0.9 !important; }",
);

pub const BACKDROP_FILTER_FALLBACK_ID: &str = "backdrop-filter-fallback";

pub const BACKDROP_FILTER_FALLBACK_CSS: &str = concat!(
    ".no-backdrop-filter .highlight-box { background: rgba(255, 255, 255, 0.98) !important; }\n",
    "[data-theme=\"dark\"] .no-backdrop-filter .highlight-box { background: rgba(26, 26, 26, 0.98) !important; }",
);

/// A single document or runtime mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FallbackAction {
    /// Add a class to the body
    MarkBody { class: String },
    /// Add a `<style>` node with a stable id
    InjectStyles { id: String, css: String },
    /// Install the expiring cache shim
    EnableCacheShim,
}

impl FallbackAction {
    pub fn mark_body(class: &str) -> Self {
        Self::MarkBody {
            class: class.to_string(),
        }
    }

    pub fn inject_styles(id: &str, css: &str) -> Self {
        Self::InjectStyles {
            id: id.to_string(),
            css: css.to_string(),
        }
    }

    /// Short label for logs and diagnostics
    pub fn label(&self) -> String {
        match self {
            Self::MarkBody { class } => format!("body class .{class}"),
            Self::InjectStyles { id, .. } => format!("style #{id}"),
            Self::EnableCacheShim => "cache shim".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Mark(&'static str),
    Inject(&'static str, &'static str),
    CacheShim,
}

impl Step {
    fn to_action(self) -> FallbackAction {
        match self {
            Self::Mark(class) => FallbackAction::mark_body(class),
            Self::Inject(id, css) => FallbackAction::inject_styles(id, css),
            Self::CacheShim => FallbackAction::EnableCacheShim,
        }
    }
}

struct Enhancement {
    key: &'static str,
    steps: &'static [Step],
    /// What the user gets instead
    summary: &'static str,
}

const ENHANCEMENTS: &[Enhancement] = &[
    Enhancement {
        key: "style-color-mix",
        steps: &[
            Step::Mark("no-color-mix"),
            Step::Inject(COLOR_MIX_FALLBACK_ID, COLOR_MIX_FALLBACK_CSS),
        ],
        summary: "Solid rgba backgrounds instead of mixed colors",
    },
    Enhancement {
        key: "style-backdrop-filter",
        steps: &[
            Step::Mark("no-backdrop-filter"),
            Step::Inject(BACKDROP_FILTER_FALLBACK_ID, BACKDROP_FILTER_FALLBACK_CSS),
        ],
        summary: "Near-opaque panels instead of blurred glass",
    },
    Enhancement {
        key: "scripting-intersection-observer",
        steps: &[Step::Mark("scroll-fallback")],
        summary: "Scroll-event driven reveal animations",
    },
    Enhancement {
        key: "scripting-resize-observer",
        steps: &[Step::Mark("resize-fallback")],
        summary: "Window resize events instead of element observers",
    },
    Enhancement {
        key: "platform-api-service-worker",
        steps: &[Step::CacheShim],
        summary: "In-page expiring cache instead of background caching",
    },
];

/// Fallback actions for every unsupported probe that has a mapping
///
/// Actions come out in table order, independent of map iteration.
pub fn plan(results: &ResultMap) -> Vec<FallbackAction> {
    ENHANCEMENTS
        .iter()
        .filter(|e| results.get(e.key).is_some_and(|r| !r.supported))
        .flat_map(|e| e.steps.iter().map(|s| s.to_action()))
        .collect()
}

/// Description of the fallback used when `key` is unsupported
pub fn fallback_summary(key: &str) -> Option<&'static str> {
    ENHANCEMENTS.iter().find(|e| e.key == key).map(|e| e.summary)
}
