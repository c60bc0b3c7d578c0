//! Probe result state
//!
//! This module defines the data structures holding the outcome of a probe run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capabilities::probes::ProbeCategory;

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Did the predicate return true?
    pub supported: bool,
    /// Copied from the probe definition
    pub critical: bool,
    /// Copied from the probe definition
    pub category: ProbeCategory,
    /// Why the predicate failed, when it raised instead of answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl ProbeResult {
    pub fn supported(category: ProbeCategory, critical: bool) -> Self {
        Self {
            supported: true,
            critical,
            category,
            fault: None,
        }
    }

    pub fn unsupported(category: ProbeCategory, critical: bool) -> Self {
        Self {
            supported: false,
            critical,
            category,
            fault: None,
        }
    }

    pub fn faulted(category: ProbeCategory, critical: bool, fault: impl Into<String>) -> Self {
        Self {
            supported: false,
            critical,
            category,
            fault: Some(fault.into()),
        }
    }

    /// Unsupported and critical
    pub fn is_critical_failure(&self) -> bool {
        self.critical && !self.supported
    }
}

/// Probe results keyed by `"<category>-<name>"`, iterated in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap {
    results: BTreeMap<String, ProbeResult>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; returns `false` (and keeps the first) if the key was
    /// already present
    pub fn insert(&mut self, key: String, result: ProbeResult) -> bool {
        if self.results.contains_key(&key) {
            return false;
        }
        self.results.insert(key, result);
        true
    }

    pub fn get(&self, key: &str) -> Option<&ProbeResult> {
        self.results.get(key)
    }

    /// `false` for unknown keys
    pub fn is_supported(&self, key: &str) -> bool {
        self.results.get(key).is_some_and(|r| r.supported)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProbeResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn supported_count(&self) -> usize {
        self.results.values().filter(|r| r.supported).count()
    }

    pub fn unsupported_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, r)| !r.supported)
            .map(|(k, _)| k)
            .collect()
    }

    pub fn critical_failure_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, r)| r.is_critical_failure())
            .map(|(k, _)| k)
            .collect()
    }

    /// Every critical probe is supported
    pub fn meets_minimum_requirements(&self) -> bool {
        !self.results.values().any(ProbeResult::is_critical_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_results() -> ResultMap {
        let mut results = ResultMap::new();
        results.insert(
            "style-css-grid".into(),
            ProbeResult::supported(ProbeCategory::Style, true),
        );
        results.insert(
            "style-color-mix".into(),
            ProbeResult::unsupported(ProbeCategory::Style, true),
        );
        results.insert(
            "platform-api-web-share".into(),
            ProbeResult::faulted(ProbeCategory::PlatformApi, false, "boom"),
        );
        results
    }

    #[test]
    fn test_queries() {
        let results = make_results();
        assert_eq!(results.len(), 3);
        assert_eq!(results.supported_count(), 1);
        assert!(results.is_supported("style-css-grid"));
        assert!(!results.is_supported("style-color-mix"));
        assert!(!results.is_supported("unknown-key"));
        assert_eq!(
            results.unsupported_keys(),
            vec!["platform-api-web-share", "style-color-mix"]
        );
        assert_eq!(results.critical_failure_keys(), vec!["style-color-mix"]);
        assert!(!results.meets_minimum_requirements());
    }

    #[test]
    fn test_first_insert_wins() {
        let mut results = ResultMap::new();
        assert!(results.insert(
            "style-css-grid".into(),
            ProbeResult::supported(ProbeCategory::Style, true)
        ));
        assert!(!results.insert(
            "style-css-grid".into(),
            ProbeResult::unsupported(ProbeCategory::Style, true)
        ));
        assert!(results.is_supported("style-css-grid"));
    }

    #[test]
    fn test_empty_map_meets_requirements() {
        assert!(ResultMap::new().meets_minimum_requirements());
    }

    #[test]
    fn test_fault_omitted_when_absent() {
        let json = serde_json::to_string(&ProbeResult::supported(ProbeCategory::Style, false))
            .unwrap();
        assert_eq!(
            json,
            r#"{"supported":true,"critical":false,"category":"style"}"#
        );
    }
}
