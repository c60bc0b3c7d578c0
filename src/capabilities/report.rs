//! Compatibility report
//!
//! Aggregates probe results into the report published for downstream UI code:
//! browser identity, supported/unsupported breakdown, critical failures and a
//! letter grade.

use std::{fmt, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::capabilities::enhancement::FallbackAction;
use crate::capabilities::state::{ProbeResult, ResultMap};

const UNKNOWN: &str = "Unknown";

// Substring checks run in this order. Legacy Edge user agents also contain
// "Chrome" and "Safari", so they are reported as one of those.
const BROWSER_PATTERNS: [(&str, &str); 4] = [
    ("Chrome", r"Chrome/(\d+)"),
    ("Firefox", r"Firefox/(\d+)"),
    ("Safari", r"Version/(\d+)"),
    ("Edge", r"Edge/(\d+)"),
];

#[expect(
    clippy::expect_used,
    reason = "patterns are compile-time constants"
)]
static VERSION_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    BROWSER_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).expect("valid browser pattern")))
        .collect()
});

/// Browser identity parsed from the user agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
}

impl BrowserInfo {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
        }
    }

    /// Identify the browser from a user-agent string
    ///
    /// The first name found as a substring wins; its version is the first
    /// capture of the matching pattern, or `"Unknown"` if that does not match.
    pub fn detect(user_agent: &str) -> Self {
        VERSION_PATTERNS
            .iter()
            .find(|(name, _)| user_agent.contains(name))
            .map_or_else(Self::unknown, |(name, pattern)| Self {
                name: (*name).to_string(),
                version: pattern
                    .captures(user_agent)
                    .and_then(|c| c.get(1))
                    .map_or_else(|| UNKNOWN.to_string(), |m| m.as_str().to_string()),
            })
    }
}

impl fmt::Display for BrowserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Coarse support grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Grade for a support percentage in `[0, 100]`
    pub fn from_percentage(p: f64) -> Self {
        if p >= 95.0 {
            Self::APlus
        } else if p >= 90.0 {
            Self::A
        } else if p >= 85.0 {
            Self::BPlus
        } else if p >= 80.0 {
            Self::B
        } else if p >= 75.0 {
            Self::CPlus
        } else if p >= 70.0 {
            Self::C
        } else if p >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    /// Grade for `supported` out of `total`; an empty catalogue is `F`
    pub fn from_counts(supported: usize, total: usize) -> Self {
        Self::from_percentage(percentage(supported, total))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn percentage(supported: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * supported as f64 / total as f64
}

/// One probe's line in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub key: String,
    #[serde(flatten)]
    pub result: ProbeResult,
}

/// Published compatibility report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub browser: BrowserInfo,
    pub supported: Vec<ReportEntry>,
    pub unsupported: Vec<ReportEntry>,
    /// Subset of `unsupported` whose probes are critical
    pub critical_failures: Vec<ReportEntry>,
    pub total_count: usize,
    pub supported_count: usize,
    pub percentage: f64,
    pub grade: Grade,
    pub meets_minimum_requirements: bool,
    /// Fallbacks planned for this browser
    pub fallbacks: Vec<FallbackAction>,
    pub generated_at: DateTime<Utc>,
}

impl CompatibilityReport {
    pub fn build(
        results: &ResultMap,
        user_agent: &str,
        fallbacks: Vec<FallbackAction>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let entry = |(key, result): (&str, &ProbeResult)| ReportEntry {
            key: key.to_string(),
            result: result.clone(),
        };

        let supported: Vec<ReportEntry> = results
            .iter()
            .filter(|(_, r)| r.supported)
            .map(entry)
            .collect();
        let unsupported: Vec<ReportEntry> = results
            .iter()
            .filter(|(_, r)| !r.supported)
            .map(entry)
            .collect();
        let critical_failures: Vec<ReportEntry> = unsupported
            .iter()
            .filter(|e| e.result.critical)
            .cloned()
            .collect();

        let total_count = results.len();
        let supported_count = supported.len();

        Self {
            browser: BrowserInfo::detect(user_agent),
            meets_minimum_requirements: critical_failures.is_empty(),
            percentage: percentage(supported_count, total_count),
            grade: Grade::from_counts(supported_count, total_count),
            supported,
            unsupported,
            critical_failures,
            total_count,
            supported_count,
            fallbacks,
            generated_at,
        }
    }

    /// `false` for unknown keys
    pub fn is_supported(&self, key: &str) -> bool {
        self.supported.iter().any(|e| e.key == key)
    }

    pub fn critical_failure_keys(&self) -> Vec<&str> {
        self.critical_failures.iter().map(|e| e.key.as_str()).collect()
    }

    /// One-line summary, e.g. `Chrome 120: 16/17 supported (94.1%), grade A`
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {}/{} supported ({:.1}%), grade {}",
            self.browser, self.supported_count, self.total_count, self.percentage, self.grade
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::probes::ProbeCategory;

    #[test]
    fn test_detect_chrome_before_safari() {
        let ua = "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) \
                  Chrome/120.0.0.0 Safari/605.1.15";
        assert_eq!(
            BrowserInfo::detect(ua),
            BrowserInfo {
                name: "Chrome".into(),
                version: "120".into()
            }
        );
    }

    #[test]
    fn test_detect_firefox_and_safari() {
        let firefox = BrowserInfo::detect("Mozilla/5.0 (X11; Linux x86_64; rv:115.0) Gecko/20100101 Firefox/115.0");
        assert_eq!(firefox.name, "Firefox");
        assert_eq!(firefox.version, "115");

        let safari = BrowserInfo::detect(
            "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        );
        assert_eq!(safari.to_string(), "Safari 17");
    }

    #[test]
    fn test_legacy_edge_is_misclassified() {
        let ua = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/70.0.3538.102 Safari/537.36 Edge/18.19582";
        assert_eq!(BrowserInfo::detect(ua).name, "Chrome");

        let edge_only = "Mozilla/5.0 (Windows NT 10.0) Edge/12.10240";
        assert_eq!(BrowserInfo::detect(edge_only).to_string(), "Edge 12");
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(BrowserInfo::detect("curl/8.4.0"), BrowserInfo::unknown());
        assert_eq!(BrowserInfo::detect(""), BrowserInfo::unknown());
    }

    #[test]
    fn test_name_without_version() {
        let info = BrowserInfo::detect("Safari/605.1.15");
        assert_eq!(info.name, "Safari");
        assert_eq!(info.version, "Unknown");
    }

    #[test]
    fn test_grade_boundaries() {
        let cases = [
            (100.0, Grade::APlus),
            (95.0, Grade::APlus),
            (94.99, Grade::A),
            (90.0, Grade::A),
            (89.99, Grade::BPlus),
            (85.0, Grade::BPlus),
            (84.99, Grade::B),
            (80.0, Grade::B),
            (79.99, Grade::CPlus),
            (75.0, Grade::CPlus),
            (74.99, Grade::C),
            (70.0, Grade::C),
            (69.99, Grade::D),
            (60.0, Grade::D),
            (59.99, Grade::F),
            (0.0, Grade::F),
        ];
        for (p, grade) in cases {
            assert_eq!(Grade::from_percentage(p), grade, "p = {p}");
        }
    }

    #[test]
    fn test_grade_monotonic_in_supported_count() {
        for total in 1..=40 {
            let mut previous = Grade::F;
            for supported in 0..=total {
                let grade = Grade::from_counts(supported, total);
                assert!(grade >= previous, "{supported}/{total}");
                previous = grade;
            }
            assert_eq!(previous, Grade::APlus);
        }
    }

    #[test]
    fn test_grade_examples() {
        assert_eq!(Grade::from_counts(11, 12), Grade::A);
        assert_eq!(Grade::from_counts(16, 17), Grade::A);
        assert_eq!(Grade::from_counts(0, 0), Grade::F);
        assert_eq!(serde_json::to_string(&Grade::CPlus).unwrap(), "\"C+\"");
    }

    #[test]
    fn test_build_partitions_results() {
        let mut results = ResultMap::new();
        results.insert(
            "style-color-mix".into(),
            ProbeResult::unsupported(ProbeCategory::Style, true),
        );
        results.insert(
            "style-flexbox-gap".into(),
            ProbeResult::unsupported(ProbeCategory::Style, false),
        );
        results.insert(
            "scripting-fetch-api".into(),
            ProbeResult::supported(ProbeCategory::Scripting, true),
        );

        let report = CompatibilityReport::build(&results, "Firefox/99", vec![], Utc::now());

        assert_eq!(report.total_count, 3);
        assert_eq!(report.supported_count, 1);
        assert_eq!(report.unsupported.len(), 2);
        assert_eq!(report.critical_failure_keys(), vec!["style-color-mix"]);
        assert!(!report.meets_minimum_requirements);
        assert!(report.is_supported("scripting-fetch-api"));
        assert!(!report.is_supported("style-color-mix"));
        assert_eq!(report.grade, Grade::F);
        assert!(report.summary_line().starts_with("Firefox 99: 1/3 supported (33.3%)"));
    }

    #[test]
    fn test_report_json_shape() {
        let mut results = ResultMap::new();
        results.insert(
            "style-css-grid".into(),
            ProbeResult::supported(ProbeCategory::Style, true),
        );
        let report = CompatibilityReport::build(&results, "", vec![], Utc::now());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["grade"], "A+");
        assert_eq!(json["meetsMinimumRequirements"], true);
        assert_eq!(json["criticalFailures"], serde_json::json!([]));
        assert_eq!(json["supported"][0]["key"], "style-css-grid");
        assert_eq!(json["supported"][0]["category"], "style");
        assert_eq!(json["browser"]["name"], "Unknown");
    }
}
