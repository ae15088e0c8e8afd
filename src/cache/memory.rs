//! In-process cache backend backed by a concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cache::traits::validate_key;
use crate::cache::{CacheContext, CacheError, CertCache};

/// In-memory cache with no eviction and no expiry.
///
/// Contents are lost when the process exits, so this is mainly useful for
/// tests and for layering in front of a persistent backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    store: DashMap<String, Vec<u8>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl CertCache for MemoryCache {
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        ctx.check()?;
        validate_key(key)?;
        self.store
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or(CacheError::Miss)
    }

    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        ctx.check()?;
        validate_key(key)?;
        self.store.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        ctx.check()?;
        validate_key(key)?;
        self.store.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_get_put() {
        let cache = MemoryCache::new();
        let ctx = CacheContext::background();
        cache.put(&ctx, "example.com", b"cert-bytes").await.unwrap();
        assert_eq!(cache.get(&ctx, "example.com").await.unwrap(), b"cert-bytes");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_miss() {
        let cache = MemoryCache::new();
        let err = cache
            .get(&CacheContext::background(), "never-written")
            .await
            .unwrap_err();
        assert!(err.is_miss());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCache::new();
        let ctx = CacheContext::background();
        cache.delete(&ctx, "absent").await.unwrap();
        cache.put(&ctx, "k", b"v").await.unwrap();
        cache.delete(&ctx, "k").await.unwrap();
        cache.delete(&ctx, "k").await.unwrap();
        assert!(cache.get(&ctx, "k").await.unwrap_err().is_miss());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_empty_value_is_not_a_miss() {
        let cache = MemoryCache::new();
        let ctx = CacheContext::background();
        cache.put(&ctx, "k", b"").await.unwrap();
        assert_eq!(cache.get(&ctx, "k").await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let cache = MemoryCache::new();
        let err = cache
            .put(&CacheContext::background(), "", b"v")
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let cache = MemoryCache::new();
        let ctx = CacheContext::background();
        ctx.cancel();
        assert!(matches!(
            cache.get(&ctx, "k").await,
            Err(CacheError::Cancelled)
        ));
    }

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(fut)
    }

    proptest! {
        #[test]
        fn prop_last_write_wins(
            key in "[a-z0-9.+_-]{1,40}",
            first in proptest::collection::vec(any::<u8>(), 0..256),
            second in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let cache = MemoryCache::new();
            let ctx = CacheContext::background();
            let got = block_on(async {
                cache.put(&ctx, &key, &first).await.unwrap();
                cache.put(&ctx, &key, &second).await.unwrap();
                cache.get(&ctx, &key).await.unwrap()
            });
            prop_assert_eq!(got, second);
        }

        #[test]
        fn prop_deleted_key_misses(
            key in "[a-z0-9.+_-]{1,40}",
            value in proptest::collection::vec(any::<u8>(), 0..64),
            written in any::<bool>(),
        ) {
            let cache = MemoryCache::new();
            let ctx = CacheContext::background();
            let err = block_on(async {
                if written {
                    cache.put(&ctx, &key, &value).await.unwrap();
                }
                cache.delete(&ctx, &key).await.unwrap();
                cache.get(&ctx, &key).await.unwrap_err()
            });
            prop_assert!(err.is_miss());
        }
    }
}
