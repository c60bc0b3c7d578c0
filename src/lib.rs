//! # browser-compat
//!
//! Browser capability detection and progressive enhancement.
//!
//! The engine probes a browser for a fixed catalogue of style, scripting and
//! platform features, classifies each as critical or optional, installs
//! targeted fallbacks where something is missing, and publishes a structured
//! compatibility report for downstream UI code.
//!
//! # Architecture
//!
//! ```text
//! browser-compat
//!   ├─> Host (BrowserEnvironment + Page traits, in-memory implementations)
//!   ├─> Capabilities
//!   │     ├─> Probe Registry (style / scripting / platform-api)
//!   │     ├─> Probe Runner (fault-isolated predicates)
//!   │     ├─> Enhancement Mapper (results -> fallback actions)
//!   │     ├─> Fallback Installer (body classes, style nodes, cache shim)
//!   │     └─> Reporter (browser identity, grade, critical failures)
//!   └─> Cache (expiring key-value store over a string storage surface)
//! ```
//!
//! # Data Flow
//!
//! **Init:** Environment → Probes → Results → Fallback plan → Page → Report

#![warn(clippy::all)]

/// Expiring key-value cache and its persistence surface
pub mod cache;

/// Capability probing, fallbacks and reporting
pub mod capabilities;

/// Engine configuration
pub mod config;

/// Browser host abstraction
///
/// Traits the engine reads from and writes to, plus in-memory
/// implementations used by the CLI and tests.
pub mod host;

pub use capabilities::{CompatibilityManager, CompatibilityReport, Grade};
