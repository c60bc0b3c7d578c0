//! Compatibility manager
//!
//! Owns the probe results and the published report. A manager initializes at
//! most once; later calls hand back the same report. The process-wide
//! singleton is a mirror for callers without access to the manager value.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::capabilities::enhancement::plan;
use crate::capabilities::fallback::FallbackInstaller;
use crate::capabilities::probes::ProbeRegistry;
use crate::capabilities::report::CompatibilityReport;
use crate::capabilities::runner::ProbeRunner;
use crate::capabilities::state::ResultMap;
use crate::config::CacheConfig;
use crate::host::{BrowserEnvironment, Clock, Page, SystemClock};

static INSTANCE: OnceLock<Arc<RwLock<CompatibilityManager>>> = OnceLock::new();

const LOCALSTORAGE_RESULT_KEY: &str = "scripting-localstorage";

/// Central compatibility manager
pub struct CompatibilityManager {
    config: CacheConfig,
    registry: ProbeRegistry,
    clock: Arc<dyn Clock>,
    results: ResultMap,
    report: Option<Arc<CompatibilityReport>>,
}

impl CompatibilityManager {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_registry(config, ProbeRegistry::standard())
    }

    pub fn with_registry(config: CacheConfig, registry: ProbeRegistry) -> Self {
        Self {
            config,
            registry,
            clock: Arc::new(SystemClock),
            results: ResultMap::new(),
            report: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Probe the browser, install fallbacks and publish the report
    ///
    /// Runs once. A second call returns the existing report without probing
    /// again or touching the page.
    pub async fn init(
        &mut self,
        env: &dyn BrowserEnvironment,
        page: &mut dyn Page,
    ) -> Arc<CompatibilityReport> {
        if let Some(report) = &self.report {
            debug!("Compatibility manager already initialized, reusing report");
            return report.clone();
        }

        info!("Initializing compatibility manager...");

        let results = ProbeRunner::run(&self.registry, env).await;
        let actions = plan(&results);

        // The shim only persists through storage the probe proved writable
        let storage = env
            .local_storage()
            .filter(|_| results.is_supported(LOCALSTORAGE_RESULT_KEY));
        let installer = FallbackInstaller::new(&self.config, self.clock.clone(), storage);
        let applied = installer.apply_all(&actions, page);
        debug!("{applied} of {} fallback actions changed the page", actions.len());

        let report = Arc::new(CompatibilityReport::build(
            &results,
            env.user_agent(),
            actions,
            self.generated_at(),
        ));
        page.publish_report(report.clone());

        info!("{}", report.summary_line());
        if !report.meets_minimum_requirements {
            info!(
                "Minimum requirements not met: {}",
                report.critical_failure_keys().join(", ")
            );
        }

        self.results = results;
        self.report = Some(report.clone());
        report
    }

    fn generated_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.report.is_some()
    }

    /// Whether the probe behind `key` passed; `false` for unknown keys
    pub fn is_supported(&self, key: &str) -> bool {
        self.results.is_supported(key)
    }

    /// Every critical probe passed; `false` before initialization
    pub fn meets_minimum_requirements(&self) -> bool {
        self.report
            .as_ref()
            .is_some_and(|r| r.meets_minimum_requirements)
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    pub fn report(&self) -> Option<Arc<CompatibilityReport>> {
        self.report.clone()
    }

    /// Initialize the process-wide manager
    ///
    /// Idempotent: if a global manager exists its report is returned and the
    /// page is left alone.
    pub async fn initialize_global(
        config: CacheConfig,
        env: &dyn BrowserEnvironment,
        page: &mut dyn Page,
    ) -> Arc<CompatibilityReport> {
        if let Some(report) = Self::global_report().await {
            return report;
        }

        let mut manager = Self::new(config);
        let report = manager.init(env, page).await;

        if INSTANCE.set(Arc::new(RwLock::new(manager))).is_err() {
            debug!("Global compatibility manager was initialized concurrently");
            if let Some(existing) = Self::global_report().await {
                return existing;
            }
        }
        report
    }

    async fn global_report() -> Option<Arc<CompatibilityReport>> {
        let manager = INSTANCE.get()?;
        let report = manager.read().await.report();
        report
    }

    /// The process-wide manager, if initialized
    pub fn global() -> Option<Arc<RwLock<CompatibilityManager>>> {
        INSTANCE.get().cloned()
    }

    pub fn is_global_initialized() -> bool {
        INSTANCE.get().is_some()
    }

    /// Generate a diagnostic summary
    pub fn diagnostic_summary(&self) -> String {
        let Some(report) = &self.report else {
            return "Compatibility manager not initialized".to_string();
        };

        let mut summary = String::new();

        summary.push_str("╭───────────────────────────────────────────╮\n");
        summary.push_str("│         Compatibility Summary             │\n");
        summary.push_str("├───────────────────────────────────────────┤\n");
        summary.push_str(&format!("│  🌐 Browser:  {:27} │\n", report.browser.to_string()));
        summary.push_str(&format!(
            "│  📊 Support:  {:27} │\n",
            format!(
                "{}/{} ({:.1}%)",
                report.supported_count, report.total_count, report.percentage
            )
        ));
        summary.push_str(&format!("│  🏅 Grade:    {:27} │\n", report.grade.as_str()));
        summary.push_str("├───────────────────────────────────────────┤\n");

        if !report.fallbacks.is_empty() {
            summary.push_str(&format!(
                "│  🔄 {:2} fallback action(s) planned          │\n",
                report.fallbacks.len()
            ));
        }

        if !report.critical_failures.is_empty() {
            summary.push_str(&format!(
                "│  ❌ {:2} critical failure(s)                 │\n",
                report.critical_failures.len()
            ));
        }

        let minimum = if report.meets_minimum_requirements {
            "✅"
        } else {
            "❌"
        };
        summary.push_str(&format!(
            "│  Minimum requirements: {}                  │\n",
            minimum
        ));
        summary.push_str("╰───────────────────────────────────────────╯");

        summary
    }

    /// Get JSON representation of the report
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report.as_deref())
    }
}
