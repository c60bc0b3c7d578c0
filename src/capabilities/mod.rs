//! Browser capability detection and fallback system
//!
//! This module probes the host browser for a fixed catalogue of style,
//! scripting and platform features, installs fallbacks for what is missing,
//! and publishes a compatibility report.
//!
//! # Pipeline
//!
//! ```text
//! ProbeRegistry ──> ProbeRunner ──> ResultMap ──> plan() ──> FallbackInstaller ──> Page
//!                                       │
//!                                       └──> CompatibilityReport ──> Page (report global)
//! ```
//!
//! The registry, runner and mapper are pure. Only the installer and the
//! report publication touch the page.
//!
//! # Usage
//!
//! ```ignore
//! use browser_compat::capabilities::CompatibilityManager;
//! use browser_compat::config::CacheConfig;
//!
//! let mut manager = CompatibilityManager::new(CacheConfig::default());
//! let report = manager.init(&env, &mut page).await;
//!
//! if !manager.meets_minimum_requirements() {
//!     // Show the unsupported-browser banner
//! }
//!
//! if manager.is_supported("scripting-intersection-observer") {
//!     // Wire up scroll animations
//! }
//! ```

mod diagnostics;
mod enhancement;
mod fallback;
mod manager;
pub mod probes;
mod report;
mod runner;
mod state;

pub use diagnostics::{
    run_diagnostics, CategoryReport, Degradation, DiagnosticReport, Recommendation, SystemHealth,
    UserImpact,
};
pub use enhancement::{
    fallback_summary, plan, FallbackAction, BACKDROP_FILTER_FALLBACK_CSS,
    BACKDROP_FILTER_FALLBACK_ID, COLOR_MIX_FALLBACK_CSS, COLOR_MIX_FALLBACK_ID,
};
pub use fallback::{FallbackInstaller, InstallOutcome};
pub use manager::CompatibilityManager;
pub use probes::{Probe, ProbeCategory, ProbeError, ProbeRegistry};
pub use report::{BrowserInfo, CompatibilityReport, Grade, ReportEntry};
pub use runner::ProbeRunner;
pub use state::{ProbeResult, ResultMap};
