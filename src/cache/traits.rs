//! CertCache trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{CacheContext, CacheError};

/// Storage contract for certificate and account key material.
///
/// All cache backends must implement this trait so a certificate manager can
/// swap them without changes.
///
/// - `get` returns [`CacheError::Miss`] when nothing is stored under the key.
/// - `put` replaces any previous value (last write wins).
/// - `delete` of a missing key succeeds.
#[async_trait]
pub trait CertCache: Send + Sync {
    /// Get the bytes stored under `key`.
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Store `data` under `key`, overwriting any existing value.
    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError>;

    /// Remove the value stored under `key`, if any.
    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError>;
}

#[async_trait]
impl<C: CertCache + ?Sized> CertCache for Arc<C> {
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        (**self).get(ctx, key).await
    }

    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        (**self).put(ctx, key, data).await
    }

    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        (**self).delete(ctx, key).await
    }
}

#[async_trait]
impl<C: CertCache + ?Sized> CertCache for Box<C> {
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        (**self).get(ctx, key).await
    }

    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        (**self).put(ctx, key, data).await
    }

    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        (**self).delete(ctx, key).await
    }
}

/// Reject keys no backend can address.
pub(crate) fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
