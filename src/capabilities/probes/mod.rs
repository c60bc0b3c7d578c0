//! Capability probes for each category.

mod platform;
mod scripting;
mod style;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::StorageError;
use crate::host::BrowserEnvironment;

pub use platform::PLATFORM_PROBES;
pub use scripting::{LOCALSTORAGE_PROBE_KEY, SCRIPTING_PROBES};
pub use style::STYLE_PROBES;

/// A probe predicate
///
/// Plain function pointers: probes carry no state and cannot observe each
/// other.
pub type Predicate = fn(&dyn BrowserEnvironment) -> Result<bool, ProbeError>;

/// Error raised by a probe predicate
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Host API needed by the probe is missing
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Host could not parse the construct under test
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Persistence surface rejected the probe
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Predicate panicked
    #[error("Panicked: {0}")]
    Panicked(String),

    /// Other error
    #[error("Other: {0}")]
    Other(String),
}

/// Probe category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeCategory {
    /// Style engine features
    Style,
    /// Language and scripting runtime features
    Scripting,
    /// Navigator-exposed platform APIs
    PlatformApi,
}

impl ProbeCategory {
    pub const ALL: [Self; 3] = [Self::Style, Self::Scripting, Self::PlatformApi];

    /// Prefix used in result keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Scripting => "scripting",
            Self::PlatformApi => "platform-api",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Style => "🎨",
            Self::Scripting => "📜",
            Self::PlatformApi => "🧩",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Style => "Style",
            Self::Scripting => "Scripting",
            Self::PlatformApi => "Platform APIs",
        }
    }
}

impl fmt::Display for ProbeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named capability check
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub name: &'static str,
    pub category: ProbeCategory,
    /// Failure makes the browser fall below minimum requirements
    pub critical: bool,
    /// Human-readable feature name for diagnostics
    pub description: &'static str,
    pub predicate: Predicate,
}

impl Probe {
    pub const fn new(
        name: &'static str,
        category: ProbeCategory,
        critical: bool,
        description: &'static str,
        predicate: Predicate,
    ) -> Self {
        Self {
            name,
            category,
            critical,
            description,
            predicate,
        }
    }

    /// Result key, `"<category>-<name>"`
    pub fn key(&self) -> String {
        format!("{}-{}", self.category.as_str(), self.name)
    }
}

/// Ordered catalogue of probes, one list per category
#[derive(Debug, Clone)]
pub struct ProbeRegistry {
    style: Vec<Probe>,
    scripting: Vec<Probe>,
    platform: Vec<Probe>,
}

impl ProbeRegistry {
    /// The built-in catalogue
    pub fn standard() -> Self {
        Self::custom(
            STYLE_PROBES.to_vec(),
            SCRIPTING_PROBES.to_vec(),
            PLATFORM_PROBES.to_vec(),
        )
    }

    /// Registry with caller-supplied lists
    pub fn custom(style: Vec<Probe>, scripting: Vec<Probe>, platform: Vec<Probe>) -> Self {
        Self {
            style,
            scripting,
            platform,
        }
    }

    pub fn by_category(&self, category: ProbeCategory) -> &[Probe] {
        match category {
            ProbeCategory::Style => &self.style,
            ProbeCategory::Scripting => &self.scripting,
            ProbeCategory::PlatformApi => &self.platform,
        }
    }

    /// Every probe: style, then scripting, then platform-api
    pub fn probes(&self) -> impl Iterator<Item = &Probe> {
        self.style
            .iter()
            .chain(self.scripting.iter())
            .chain(self.platform.iter())
    }

    pub fn len(&self) -> usize {
        self.style.len() + self.scripting.len() + self.platform.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a probe by result key
    pub fn find(&self, key: &str) -> Option<&Probe> {
        self.probes().find(|p| p.key() == key)
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_standard_catalogue_shape() {
        let registry = ProbeRegistry::standard();
        assert_eq!(registry.by_category(ProbeCategory::Style).len(), 6);
        assert_eq!(registry.by_category(ProbeCategory::Scripting).len(), 6);
        assert_eq!(registry.by_category(ProbeCategory::PlatformApi).len(), 5);
        assert_eq!(registry.len(), 17);
    }

    #[test]
    fn test_keys_are_unique() {
        let registry = ProbeRegistry::standard();
        let keys: HashSet<String> = registry.probes().map(Probe::key).collect();
        assert_eq!(keys.len(), registry.len());
    }

    #[test]
    fn test_criticality_flags() {
        let registry = ProbeRegistry::standard();
        let critical: Vec<String> = registry
            .probes()
            .filter(|p| p.critical)
            .map(Probe::key)
            .collect();

        assert_eq!(
            critical,
            vec![
                "style-color-mix",
                "style-css-grid",
                "style-css-custom-properties",
                "scripting-es6-modules",
                "scripting-async-await",
                "scripting-fetch-api",
            ]
        );
    }

    #[test]
    fn test_category_order_and_lookup() {
        let registry = ProbeRegistry::standard();
        let first = registry.probes().next().unwrap();
        assert_eq!(first.key(), "style-color-mix");

        let sw = registry.find("platform-api-service-worker").unwrap();
        assert_eq!(sw.category, ProbeCategory::PlatformApi);
        assert!(!sw.critical);
        assert!(registry.find("style-nope").is_none());
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ProbeCategory::PlatformApi).unwrap(),
            "\"platform-api\""
        );
        assert_eq!(ProbeCategory::Scripting.to_string(), "scripting");
    }
}
