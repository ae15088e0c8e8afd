//! Cache manager that dispatches to the configured backend.

use std::sync::Arc;

use crate::cache::firestore::FirestoreCache;
use crate::cache::memory::MemoryCache;
use crate::cache::{CacheBackend, CacheConfig, CacheContext, CacheError, CertCache};

/// Cache manager that provides access to the configured cache backend.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CertCache>,
    config: CacheConfig,
}

impl CacheManager {
    /// Create a new cache manager with the given configuration.
    ///
    /// For Firestore this connects and authenticates before returning.
    pub async fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CertCache> = match config.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::Firestore => Arc::new(FirestoreCache::connect(&config.firestore).await?),
        };

        Ok(Self { backend, config })
    }

    /// Wrap an already constructed backend.
    pub fn from_backend(backend: Arc<dyn CertCache>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &Arc<dyn CertCache> {
        &self.backend
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ========================================================================
    // CertCache proxy methods
    // ========================================================================

    pub async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        self.backend.get(ctx, key).await
    }

    pub async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        self.backend.put(ctx, key, data).await
    }

    pub async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        self.backend.delete(ctx, key).await
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("backend", &self.config.backend)
            .finish()
    }
}
