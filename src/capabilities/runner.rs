//! Probe execution
//!
//! Runs every probe in a registry exactly once. A predicate that returns an
//! error or panics is recorded as unsupported; nothing escapes the runner.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::capabilities::probes::{Probe, ProbeError, ProbeRegistry};
use crate::capabilities::state::{ProbeResult, ResultMap};
use crate::host::BrowserEnvironment;

/// Probe runner
pub struct ProbeRunner;

impl ProbeRunner {
    /// Evaluate the whole registry against `env`
    pub async fn run(registry: &ProbeRegistry, env: &dyn BrowserEnvironment) -> ResultMap {
        info!("Running {} capability probes...", registry.len());

        let mut results = ResultMap::new();
        for probe in registry.probes() {
            let key = probe.key();
            let result = Self::evaluate(probe, env);
            debug!("{key}: supported={}", result.supported);

            if !results.insert(key.clone(), result) {
                warn!("Duplicate probe key {key}, keeping first result");
            }

            tokio::task::yield_now().await;
        }

        info!(
            "Probes complete: {}/{} supported",
            results.supported_count(),
            results.len()
        );
        results
    }

    /// Run a single predicate inside the fault-isolating wrapper
    pub fn evaluate(probe: &Probe, env: &dyn BrowserEnvironment) -> ProbeResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (probe.predicate)(env)));

        match outcome {
            Ok(Ok(true)) => ProbeResult::supported(probe.category, probe.critical),
            Ok(Ok(false)) => ProbeResult::unsupported(probe.category, probe.critical),
            Ok(Err(e)) => {
                debug!("Probe {} raised: {e}", probe.key());
                ProbeResult::faulted(probe.category, probe.critical, e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Probe {} panicked: {message}", probe.key());
                let fault = ProbeError::Panicked(message);
                ProbeResult::faulted(probe.category, probe.critical, fault.to_string())
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
