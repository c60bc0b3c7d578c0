//! Diagnostic reporting for compatibility detection
//!
//! Provides detailed diagnostic reports for troubleshooting a browser's
//! compatibility profile.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::enhancement::fallback_summary;
use crate::capabilities::probes::{ProbeCategory, ProbeRegistry};
use crate::capabilities::report::{CompatibilityReport, Grade, ReportEntry};

/// Comprehensive diagnostic report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Overall browser health
    pub health: SystemHealth,
    /// Per-category reports
    pub categories: Vec<CategoryReport>,
    /// Unsupported features and how they degrade
    pub degradations: Vec<Degradation>,
    /// Recommendations
    pub recommendations: Vec<Recommendation>,
}

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemHealth {
    /// Everything supported
    Healthy,
    /// Optional features missing
    Degraded,
    /// Critical features missing but most of the catalogue works
    Limited,
    /// Critical features missing and support is poor
    Critical,
}

impl SystemHealth {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Healthy => "💚",
            Self::Degraded => "💛",
            Self::Limited => "🟠",
            Self::Critical => "🔴",
        }
    }
}

/// Report for a single probe category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: ProbeCategory,
    /// What's working
    pub working: Vec<String>,
    /// What's not working
    pub not_working: Vec<String>,
}

/// User-facing impact level of a missing feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserImpact {
    /// User won't notice any difference
    Minimal,
    /// Slight visual or behavioral difference, covered by a fallback
    Minor,
    /// Noticeable reduction in functionality
    Moderate,
    /// Page may not work as intended
    Major,
}

impl UserImpact {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Minimal => "ℹ️",
            Self::Minor => "⚠️",
            Self::Moderate => "🟠",
            Self::Major => "🔴",
        }
    }
}

impl fmt::Display for UserImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An unsupported feature and what replaces it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Degradation {
    /// Result key of the failed probe
    pub key: String,
    /// Which feature is missing
    pub feature: String,
    /// What fallback is being used
    pub fallback: String,
    /// Impact on user experience
    pub user_impact: UserImpact,
}

/// A recommendation for improving compatibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Priority (higher = more important)
    pub priority: u8,
    /// What to do
    pub action: String,
    /// Expected improvement
    pub benefit: String,
}

fn feature_name(registry: &ProbeRegistry, key: &str) -> String {
    registry
        .find(key)
        .map_or_else(|| key.to_string(), |p| p.description.to_string())
}

fn degradation_for(registry: &ProbeRegistry, entry: &ReportEntry) -> Degradation {
    let fallback = fallback_summary(&entry.key);

    let user_impact = if entry.result.critical {
        UserImpact::Major
    } else if fallback.is_some() {
        UserImpact::Minor
    } else if entry.result.category == ProbeCategory::PlatformApi {
        UserImpact::Minimal
    } else {
        UserImpact::Moderate
    };

    Degradation {
        key: entry.key.clone(),
        feature: feature_name(registry, &entry.key),
        fallback: fallback.unwrap_or("None (feature unavailable)").to_string(),
        user_impact,
    }
}

pub fn run_diagnostics(report: &CompatibilityReport, registry: &ProbeRegistry) -> DiagnosticReport {
    let categories = ProbeCategory::ALL
        .iter()
        .map(|&category| CategoryReport {
            category,
            working: report
                .supported
                .iter()
                .filter(|e| e.result.category == category)
                .map(|e| feature_name(registry, &e.key))
                .collect(),
            not_working: report
                .unsupported
                .iter()
                .filter(|e| e.result.category == category)
                .map(|e| match &e.result.fault {
                    Some(fault) => format!("{} ({fault})", feature_name(registry, &e.key)),
                    None => feature_name(registry, &e.key),
                })
                .collect(),
        })
        .collect();

    let degradations: Vec<Degradation> = report
        .unsupported
        .iter()
        .map(|e| degradation_for(registry, e))
        .collect();

    let mut recommendations = Vec::new();

    if !report.critical_failures.is_empty() {
        recommendations.push(Recommendation {
            priority: 3,
            action: format!(
                "Update {} or switch to a current evergreen browser",
                report.browser.name
            ),
            benefit: "Restore required layout and scripting features".into(),
        });
    }

    if !report.is_supported("scripting-localstorage") {
        recommendations.push(Recommendation {
            priority: 2,
            action: "Allow site data storage for this page".into(),
            benefit: "Cached data survives reloads".into(),
        });
    }

    if !report.is_supported("platform-api-service-worker") {
        recommendations.push(Recommendation {
            priority: 1,
            action: "Use a browser with service worker support over HTTPS".into(),
            benefit: "Background caching instead of the in-page cache shim".into(),
        });
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));

    let health = if report.unsupported.is_empty() {
        SystemHealth::Healthy
    } else if report.meets_minimum_requirements {
        SystemHealth::Degraded
    } else if report.grade >= Grade::C {
        SystemHealth::Limited
    } else {
        SystemHealth::Critical
    };

    DiagnosticReport {
        health,
        categories,
        degradations,
        recommendations,
    }
}

impl DiagnosticReport {
    pub fn format_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} Browser Health: {:?}\n",
            self.health.emoji(),
            self.health
        ));
        output.push_str("\n=== Category Status ===\n\n");

        for report in &self.categories {
            output.push_str(&format!(
                "{} {} - {}/{} supported\n",
                report.category.emoji(),
                report.category.title(),
                report.working.len(),
                report.working.len() + report.not_working.len()
            ));

            if !report.working.is_empty() {
                output.push_str("   Working:\n");
                for item in &report.working {
                    output.push_str(&format!("     ✅ {item}\n"));
                }
            }

            if !report.not_working.is_empty() {
                output.push_str("   Not working:\n");
                for item in &report.not_working {
                    output.push_str(&format!("     ❌ {item}\n"));
                }
            }
            output.push('\n');
        }

        if !self.degradations.is_empty() {
            output.push_str("=== Active Degradations ===\n\n");
            for deg in &self.degradations {
                output.push_str(&format!(
                    "  {} {} [{}] - {}\n",
                    deg.user_impact.emoji(),
                    deg.feature,
                    deg.key,
                    deg.user_impact
                ));
                output.push_str(&format!("    Fallback: {}\n", deg.fallback));
            }
            output.push('\n');
        }

        if !self.recommendations.is_empty() {
            output.push_str("=== Recommendations ===\n\n");
            for rec in &self.recommendations {
                output.push_str(&format!("  [{}] {}\n", rec.priority, rec.action));
                output.push_str(&format!("      Benefit: {}\n", rec.benefit));
            }
        }

        output
    }
}
