//! Fallback installation
//!
//! Applies [`FallbackAction`]s to a [`Page`]. Every action is idempotent by
//! identity: a class already on the body, a style id already in the document,
//! or a cache shim already published all turn the action into a no-op.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{ExpiringCache, MemoryStorage, Storage};
use crate::capabilities::enhancement::FallbackAction;
use crate::config::CacheConfig;
use crate::host::{Clock, Page};

/// What happened when an action was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The page was mutated
    Applied,
    /// The page already carried this fallback
    AlreadyPresent,
}

/// Installs fallbacks into a page
pub struct FallbackInstaller {
    clock: Arc<dyn Clock>,
    storage: Option<Arc<dyn Storage>>,
    default_ttl_ms: u64,
    quota_bytes: usize,
}

impl FallbackInstaller {
    /// `storage` backs the cache shim; when `None` the shim gets a private
    /// in-memory store bounded by the configured quota.
    pub fn new(
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
        storage: Option<Arc<dyn Storage>>,
    ) -> Self {
        Self {
            clock,
            storage,
            default_ttl_ms: config.default_ttl_ms,
            quota_bytes: config.quota_bytes,
        }
    }

    pub fn apply(&self, action: &FallbackAction, page: &mut dyn Page) -> InstallOutcome {
        let outcome = match action {
            FallbackAction::MarkBody { class } => {
                if page.body_has_class(class) {
                    InstallOutcome::AlreadyPresent
                } else {
                    page.add_body_class(class);
                    InstallOutcome::Applied
                }
            }
            FallbackAction::InjectStyles { id, css } => {
                if page.element_exists(id) {
                    debug!("Element #{id} already present, skipping style injection");
                    InstallOutcome::AlreadyPresent
                } else {
                    page.append_head_style(id, css);
                    InstallOutcome::Applied
                }
            }
            FallbackAction::EnableCacheShim => {
                if page.cache_shim().is_some() {
                    InstallOutcome::AlreadyPresent
                } else {
                    page.publish_cache_shim(Arc::new(self.build_cache()));
                    InstallOutcome::Applied
                }
            }
        };

        if outcome == InstallOutcome::Applied {
            info!("Installed fallback: {}", action.label());
        }
        outcome
    }

    /// Apply actions in order
    pub fn apply_all(&self, actions: &[FallbackAction], page: &mut dyn Page) -> usize {
        let mut applied = 0;
        for action in actions {
            if self.apply(action, page) == InstallOutcome::Applied {
                applied += 1;
            }
        }
        applied
    }

    fn build_cache(&self) -> ExpiringCache {
        let storage: Arc<dyn Storage> = match &self.storage {
            Some(storage) => storage.clone(),
            None => {
                debug!("No usable persistent storage, cache shim stays in memory");
                Arc::new(MemoryStorage::new(self.quota_bytes))
            }
        };
        ExpiringCache::new(storage, self.clock.clone()).with_default_ttl(self.default_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capabilities::enhancement::{COLOR_MIX_FALLBACK_CSS, COLOR_MIX_FALLBACK_ID};
    use crate::host::{ManualClock, MemoryPage};

    fn make_installer(storage: Option<Arc<dyn Storage>>) -> FallbackInstaller {
        FallbackInstaller::new(
            &CacheConfig::default(),
            Arc::new(ManualClock::new(0)),
            storage,
        )
    }

    #[test]
    fn test_mark_body_is_set_union() {
        let installer = make_installer(None);
        let mut page = MemoryPage::new();
        let action = FallbackAction::mark_body("scroll-fallback");

        assert_eq!(installer.apply(&action, &mut page), InstallOutcome::Applied);
        assert_eq!(
            installer.apply(&action, &mut page),
            InstallOutcome::AlreadyPresent
        );
        assert_eq!(page.body_classes(), ["scroll-fallback".to_string()]);
    }

    #[test]
    fn test_inject_styles_once_per_id() {
        let installer = make_installer(None);
        let mut page = MemoryPage::new();
        let action = FallbackAction::inject_styles(COLOR_MIX_FALLBACK_ID, COLOR_MIX_FALLBACK_CSS);

        installer.apply(&action, &mut page);
        installer.apply(&action, &mut page);

        assert_eq!(page.count_id(COLOR_MIX_FALLBACK_ID), 1);
        assert_eq!(
            page.style(COLOR_MIX_FALLBACK_ID).unwrap().css,
            COLOR_MIX_FALLBACK_CSS
        );
    }

    #[test]
    fn test_foreign_element_blocks_injection() {
        let installer = make_installer(None);
        let mut page = MemoryPage::new().with_element(COLOR_MIX_FALLBACK_ID);
        let action = FallbackAction::inject_styles(COLOR_MIX_FALLBACK_ID, COLOR_MIX_FALLBACK_CSS);

        assert_eq!(
            installer.apply(&action, &mut page),
            InstallOutcome::AlreadyPresent
        );
        assert!(page.head_styles().is_empty());
    }

    #[test]
    fn test_cache_shim_uses_supplied_storage() {
        let storage = Arc::new(MemoryStorage::default());
        let installer = make_installer(Some(storage.clone()));
        let mut page = MemoryPage::new();

        assert_eq!(
            installer.apply(&FallbackAction::EnableCacheShim, &mut page),
            InstallOutcome::Applied
        );
        let shim = page.cache_shim().unwrap();
        assert_eq!(shim.default_ttl_ms(), 300_000);

        shim.set("k", &json!(1));
        assert!(storage.get_item("k").unwrap().is_some());
        assert_eq!(shim.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_cache_shim_published_once() {
        let installer = make_installer(None);
        let mut page = MemoryPage::new();

        installer.apply(&FallbackAction::EnableCacheShim, &mut page);
        let first = page.cache_shim().unwrap();
        first.set("k", "v");

        assert_eq!(
            installer.apply(&FallbackAction::EnableCacheShim, &mut page),
            InstallOutcome::AlreadyPresent
        );
        assert!(Arc::ptr_eq(&first, &page.cache_shim().unwrap()));
        assert_eq!(page.cache_shim().unwrap().get("k"), Some(json!("v")));
    }

    #[test]
    fn test_apply_all_counts_mutations() {
        let installer = make_installer(None);
        let mut page = MemoryPage::new();
        let actions = vec![
            FallbackAction::mark_body("a"),
            FallbackAction::mark_body("a"),
            FallbackAction::EnableCacheShim,
        ];

        assert_eq!(installer.apply_all(&actions, &mut page), 2);
        assert_eq!(installer.apply_all(&actions, &mut page), 0);
    }
}
