//! Static browser environment
//!
//! A browser described up front: everything is supported unless the profile
//! lists it as missing. Profiles load from TOML so the CLI can evaluate
//! arbitrary browsers:
//!
//! ```toml
//! user_agent = "Mozilla/5.0 ... Firefox/115.0"
//! missing_navigator = ["share"]
//!
//! [[unsupported_css]]
//! property = "color"
//! value = "color-mix(in srgb, red 50%, blue 50%)"
//! ```

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::BrowserEnvironment;
use crate::cache::{MemoryStorage, Storage, DEFAULT_QUOTA_BYTES};
use crate::capabilities::ProbeError;

/// User agent of a current desktop Chrome
pub const MODERN_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A single `property: value` style declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssDeclaration {
    pub property: String,
    pub value: String,
}

impl CssDeclaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    fn matches(&self, property: &str, value: &str) -> bool {
        self.property == property && self.value == value
    }
}

/// How the profile exposes `localStorage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalStorageMode {
    /// Present and writable
    #[default]
    Available,
    /// Present but every call throws
    Disabled,
    /// Not present at all
    Missing,
}

/// Serializable description of a browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentProfile {
    pub user_agent: String,
    /// `false` when the style engine cannot be queried (old engines without
    /// a supports API)
    pub css_api: bool,
    pub unsupported_css: Vec<CssDeclaration>,
    pub missing_symbols: Vec<String>,
    pub async_functions: bool,
    pub missing_globals: Vec<String>,
    pub missing_navigator: Vec<String>,
    pub local_storage: LocalStorageMode,
    pub storage_quota_bytes: usize,
}

impl Default for EnvironmentProfile {
    fn default() -> Self {
        Self {
            user_agent: MODERN_USER_AGENT.to_string(),
            css_api: true,
            unsupported_css: Vec::new(),
            missing_symbols: Vec::new(),
            async_functions: true,
            missing_globals: Vec::new(),
            missing_navigator: Vec::new(),
            local_storage: LocalStorageMode::Available,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl EnvironmentProfile {
    /// Load a profile from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse profile")
    }
}

/// [`BrowserEnvironment`] backed by an [`EnvironmentProfile`]
pub struct StaticEnvironment {
    profile: EnvironmentProfile,
    storage: Option<Arc<dyn Storage>>,
}

impl StaticEnvironment {
    pub fn from_profile(profile: EnvironmentProfile) -> Self {
        let storage = Self::storage_for(&profile);
        Self { profile, storage }
    }

    /// A browser that supports everything in the catalogue
    pub fn modern() -> Self {
        Self::from_profile(EnvironmentProfile::default())
    }

    fn storage_for(profile: &EnvironmentProfile) -> Option<Arc<dyn Storage>> {
        match profile.local_storage {
            LocalStorageMode::Available => {
                Some(Arc::new(MemoryStorage::new(profile.storage_quota_bytes)))
            }
            LocalStorageMode::Disabled => Some(Arc::new(MemoryStorage::disabled())),
            LocalStorageMode::Missing => None,
        }
    }

    pub fn profile(&self) -> &EnvironmentProfile {
        &self.profile
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.profile.user_agent = user_agent.into();
        self
    }

    pub fn without_css(mut self, property: &str, value: &str) -> Self {
        self.profile
            .unsupported_css
            .push(CssDeclaration::new(property, value));
        self
    }

    pub fn without_css_api(mut self) -> Self {
        self.profile.css_api = false;
        self
    }

    pub fn without_symbol(mut self, name: &str) -> Self {
        self.profile.missing_symbols.push(name.to_string());
        self
    }

    pub fn without_async_functions(mut self) -> Self {
        self.profile.async_functions = false;
        self
    }

    pub fn without_global(mut self, name: &str) -> Self {
        self.profile.missing_globals.push(name.to_string());
        self
    }

    pub fn without_navigator(mut self, name: &str) -> Self {
        self.profile.missing_navigator.push(name.to_string());
        self
    }

    /// Replace the persistence surface, e.g. to inspect it afterwards
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.profile.local_storage = LocalStorageMode::Available;
        self.storage = Some(storage);
        self
    }

    pub fn with_disabled_storage(mut self) -> Self {
        self.profile.local_storage = LocalStorageMode::Disabled;
        self.storage = Some(Arc::new(MemoryStorage::disabled()));
        self
    }

    pub fn without_storage(mut self) -> Self {
        self.profile.local_storage = LocalStorageMode::Missing;
        self.storage = None;
        self
    }
}

impl BrowserEnvironment for StaticEnvironment {
    fn user_agent(&self) -> &str {
        &self.profile.user_agent
    }

    fn css_supports(&self, property: &str, value: &str) -> Result<bool, ProbeError> {
        if !self.profile.css_api {
            return Err(ProbeError::Unavailable("CSS.supports".into()));
        }
        Ok(!self
            .profile
            .unsupported_css
            .iter()
            .any(|d| d.matches(property, value)))
    }

    fn has_symbol(&self, name: &str) -> bool {
        !self.profile.missing_symbols.iter().any(|s| s == name)
    }

    fn async_function_returns_promise(&self) -> Result<bool, ProbeError> {
        if self.profile.async_functions {
            Ok(true)
        } else {
            Err(ProbeError::Syntax("async functions are not parsed".into()))
        }
    }

    fn has_global(&self, name: &str) -> bool {
        !self.profile.missing_globals.iter().any(|g| g == name)
    }

    fn navigator_has(&self, name: &str) -> bool {
        !self.profile.missing_navigator.iter().any(|n| n == name)
    }

    fn local_storage(&self) -> Option<Arc<dyn Storage>> {
        self.storage.clone()
    }
}
