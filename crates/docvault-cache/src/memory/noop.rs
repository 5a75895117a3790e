//! Provider used when caching is disabled.

use std::time::Duration;

use async_trait::async_trait;

use docvault_core::result::AppResult;
use docvault_core::traits::cache::CacheProvider;

/// A cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheProvider;

#[async_trait]
impl CacheProvider for NoopCacheProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn set_default(&self, _key: &str, _value: &str) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn delete_pattern(&self, _pattern: &str) -> AppResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        Ok(())
    }
}
