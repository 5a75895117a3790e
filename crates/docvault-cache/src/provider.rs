//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use docvault_core::config::cache::CacheConfig;
use docvault_core::result::AppResult;
use docvault_core::traits::cache::CacheProvider;

use crate::memory::{MemoryCacheProvider, NoopCacheProvider};

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let inner: Arc<dyn CacheProvider> = if config.enabled {
            info!(
                max_capacity = config.memory.max_capacity,
                ttl_seconds = config.default_ttl_seconds,
                "Initializing in-memory listing cache"
            );
            Arc::new(MemoryCacheProvider::new(
                &config.memory,
                config.default_ttl_seconds,
            ))
        } else {
            info!("Listing cache disabled");
            Arc::new(NoopCacheProvider)
        };

        Self { inner }
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    /// A manager whose cache never holds anything.
    pub fn disabled() -> Self {
        Self::from_provider(Arc::new(NoopCacheProvider))
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn CacheProvider {
        self.inner.as_ref()
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set_default(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        self.inner.delete_pattern(pattern).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.inner.flush_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_config_never_hits() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let manager = CacheManager::new(&config);
        manager.set_default("k", "v").await.unwrap();
        assert_eq!(manager.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_enabled_config_caches() {
        let manager = CacheManager::new(&CacheConfig::default());
        manager.set_default("k", "v").await.unwrap();
        assert_eq!(manager.get("k").await.unwrap(), Some("v".to_string()));
    }
}
