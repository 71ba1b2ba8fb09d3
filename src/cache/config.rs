//! Cache configuration.

use std::num::NonZeroUsize;

const DEFAULT_ENTRY_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store responses at all.
    pub enabled: bool,
    /// Maximum cached responses before LRU eviction.
    pub entry_limit: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entry_limit: NonZeroUsize::new(DEFAULT_ENTRY_LIMIT).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            entry_limit: settings.entry_limit,
        }
    }
}
