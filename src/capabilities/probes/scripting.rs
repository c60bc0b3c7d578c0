//! Scripting runtime probes

use super::{Probe, ProbeCategory, ProbeError};
use crate::host::BrowserEnvironment;

/// Key written and deleted by the `localstorage` probe
pub const LOCALSTORAGE_PROBE_KEY: &str = "__compat_probe__";

pub const SCRIPTING_PROBES: [Probe; 6] = [
    Probe::new(
        "es6-modules",
        ProbeCategory::Scripting,
        true,
        "ES modules",
        es6_modules,
    ),
    Probe::new(
        "async-await",
        ProbeCategory::Scripting,
        true,
        "async/await",
        async_await,
    ),
    Probe::new(
        "fetch-api",
        ProbeCategory::Scripting,
        true,
        "Fetch API",
        fetch_api,
    ),
    Probe::new(
        "localstorage",
        ProbeCategory::Scripting,
        false,
        "Local storage",
        localstorage,
    ),
    Probe::new(
        "intersection-observer",
        ProbeCategory::Scripting,
        false,
        "IntersectionObserver",
        intersection_observer,
    ),
    Probe::new(
        "resize-observer",
        ProbeCategory::Scripting,
        false,
        "ResizeObserver",
        resize_observer,
    ),
];

// Proxy check: the iteration protocol shipped alongside module support, so its
// symbol stands in for modules themselves.
fn es6_modules(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.has_symbol("iterator"))
}

fn async_await(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.async_function_returns_promise()
}

fn fetch_api(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.has_global("fetch"))
}

fn localstorage(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    let storage = env
        .local_storage()
        .ok_or_else(|| ProbeError::Unavailable("localStorage".into()))?;

    storage.set_item(LOCALSTORAGE_PROBE_KEY, LOCALSTORAGE_PROBE_KEY)?;
    storage.remove_item(LOCALSTORAGE_PROBE_KEY)?;
    Ok(true)
}

fn intersection_observer(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.has_global("IntersectionObserver"))
}

fn resize_observer(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.has_global("ResizeObserver"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{MemoryStorage, Storage};
    use crate::host::StaticEnvironment;

    #[test]
    fn test_localstorage_round_trip_leaves_no_trace() {
        let storage = Arc::new(MemoryStorage::default());
        let env = StaticEnvironment::modern().with_storage(storage.clone());

        assert!(localstorage(&env).unwrap());
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_localstorage_failures() {
        let missing = StaticEnvironment::modern().without_storage();
        assert!(matches!(
            localstorage(&missing),
            Err(ProbeError::Unavailable(_))
        ));

        let disabled = StaticEnvironment::modern().with_disabled_storage();
        assert!(matches!(localstorage(&disabled), Err(ProbeError::Storage(_))));

        let full = StaticEnvironment::modern().with_storage(Arc::new(MemoryStorage::new(4)));
        assert!(localstorage(&full).is_err());
    }

    #[test]
    fn test_global_presence_probes() {
        let env = StaticEnvironment::modern()
            .without_global("fetch")
            .without_global("ResizeObserver");

        assert!(!fetch_api(&env).unwrap());
        assert!(!resize_observer(&env).unwrap());
        assert!(intersection_observer(&env).unwrap());
    }

    #[test]
    fn test_es6_modules_checks_iterator_symbol() {
        let env = StaticEnvironment::modern().without_symbol("iterator");
        assert!(!es6_modules(&env).unwrap());
        assert!(es6_modules(&StaticEnvironment::modern()).unwrap());
    }

    #[test]
    fn test_async_await_error_propagates() {
        let env = StaticEnvironment::modern().without_async_functions();
        assert!(async_await(&env).is_err());
    }
}
