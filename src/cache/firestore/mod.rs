//! Firestore-backed certificate cache.
//!
//! Each cache key becomes a document in one collection (`certcache` unless
//! configured otherwise). The document has a single string field, `data`,
//! holding the value in the configured [`ValueEncoding`]:
//!
//! ```text
//! projects/{project}/databases/{database}/documents/{collection}/{key}
//!   data: stringValue
//! ```
//!
//! The store's `NOT_FOUND` status is the only thing translated into
//! [`CacheError::Miss`]; every other failure reaches the caller unchanged.

mod client;
mod codec;
mod credentials;
mod document;
#[cfg(test)]
mod mock_server;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::traits::validate_key;
use crate::cache::{CacheContext, CacheError, CertCache, FirestoreConfig};

pub use client::{EMULATOR_HOST_ENV, FirestoreClient};
pub use codec::ValueEncoding;
pub use credentials::{Credentials, DATASTORE_SCOPE, ServiceAccountKey, TokenSource};
pub use document::{Document, DocumentStore, Value};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "certcache";

/// Name of the field holding the cached value.
pub const DATA_FIELD: &str = "data";

/// Firestore document IDs are limited to 1,500 bytes.
const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// [`CertCache`] over a document store, Firestore by default.
#[derive(Debug)]
pub struct FirestoreCache<S = FirestoreClient> {
    store: S,
    collection: String,
    encoding: ValueEncoding,
}

impl FirestoreCache<FirestoreClient> {
    /// Connect to Firestore and obtain the first access token.
    ///
    /// Failure here means the cache is unusable; callers normally treat it as
    /// fatal at startup.
    pub async fn connect(config: &FirestoreConfig) -> Result<Self, CacheError> {
        let client = FirestoreClient::from_config(config)?;
        client.warm_up().await?;

        info!(
            project_id = %config.project_id,
            database = %config.database,
            collection = %config.collection,
            encoding = %config.encoding,
            "connected to Firestore certificate cache"
        );

        Ok(Self::with_store(
            client,
            config.collection.clone(),
            config.encoding,
        ))
    }
}

impl<S: DocumentStore> FirestoreCache<S> {
    pub fn with_store(store: S, collection: impl Into<String>, encoding: ValueEncoding) -> Self {
        Self {
            store,
            collection: collection.into(),
            encoding,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn encoding(&self) -> ValueEncoding {
        self.encoding
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn validate_document_id(key: &str) -> Result<(), CacheError> {
    validate_key(key)?;
    if key.contains('/') {
        return Err(CacheError::InvalidKey(format!("'{key}' contains '/'")));
    }
    if key == "." || key == ".." {
        return Err(CacheError::InvalidKey(format!("'{key}' is reserved")));
    }
    if key.len() >= 4 && key.starts_with("__") && key.ends_with("__") {
        return Err(CacheError::InvalidKey(format!("'{key}' matches the reserved __.*__ pattern")));
    }
    if key.len() > MAX_DOCUMENT_ID_BYTES {
        return Err(CacheError::InvalidKey(format!(
            "key is {} bytes, the limit is {MAX_DOCUMENT_ID_BYTES}",
            key.len()
        )));
    }
    Ok(())
}

#[async_trait]
impl<S: DocumentStore> CertCache for FirestoreCache<S> {
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        validate_document_id(key)?;
        debug!(key, collection = %self.collection, "fetching certificate data");

        let document = match ctx.run(self.store.get_document(&self.collection, key)).await {
            Ok(document) => document,
            Err(CacheError::Store(e)) if e.is_not_found() => {
                debug!(key, collection = %self.collection, "certificate cache miss");
                return Err(CacheError::Miss);
            }
            Err(e) => {
                warn!(key, collection = %self.collection, error = %e, "failed to fetch certificate data");
                return Err(e);
            }
        };

        let field = document.string_field(DATA_FIELD).ok_or_else(|| {
            CacheError::Serialization(format!(
                "document {}/{} has no string field '{}'",
                self.collection, key, DATA_FIELD
            ))
        })?;
        let data = self.encoding.decode(field).inspect_err(|e| {
            warn!(key, collection = %self.collection, error = %e, "failed to decode certificate data");
        })?;

        debug!(key, bytes = data.len(), "fetched certificate data");
        Ok(data)
    }

    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        validate_document_id(key)?;
        debug!(key, collection = %self.collection, bytes = data.len(), "storing certificate data");

        let document = Document::with_string(DATA_FIELD, self.encoding.encode(data)?);
        ctx.run(self.store.set_document(&self.collection, key, &document))
            .await
            .inspect_err(|e| {
                warn!(key, collection = %self.collection, error = %e, "failed to store certificate data");
            })?;

        debug!(key, "stored certificate data");
        Ok(())
    }

    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        validate_document_id(key)?;
        debug!(key, collection = %self.collection, "deleting certificate data");

        ctx.run(self.store.delete_document(&self.collection, key))
            .await
            .inspect_err(|e| {
                warn!(key, collection = %self.collection, error = %e, "failed to delete certificate data");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{StatusCode, StoreError};
    use mock_server::spawn_mock;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Document store kept in a map, with an optional forced failure.
    #[derive(Default)]
    struct MapStore {
        docs: Mutex<HashMap<(String, String), Document>>,
        fail_with: Option<StatusCode>,
        stall: bool,
    }

    impl MapStore {
        fn failing(code: StatusCode) -> Self {
            Self {
                fail_with: Some(code),
                ..Default::default()
            }
        }

        fn stalling() -> Self {
            Self {
                stall: true,
                ..Default::default()
            }
        }

        async fn before(&self) -> Result<(), CacheError> {
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            match self.fail_with {
                Some(code) => Err(StoreError::new(code, "injected").into()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MapStore {
        async fn get_document(&self, collection: &str, id: &str) -> Result<Document, CacheError> {
            self.before().await?;
            self.docs
                .lock()
                .unwrap()
                .get(&(collection.to_string(), id.to_string()))
                .cloned()
                .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")).into())
        }

        async fn set_document(
            &self,
            collection: &str,
            id: &str,
            document: &Document,
        ) -> Result<(), CacheError> {
            self.before().await?;
            self.docs
                .lock()
                .unwrap()
                .insert((collection.to_string(), id.to_string()), document.clone());
            Ok(())
        }

        async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CacheError> {
            self.before().await?;
            self.docs
                .lock()
                .unwrap()
                .remove(&(collection.to_string(), id.to_string()));
            Ok(())
        }
    }

    fn cache(store: MapStore) -> FirestoreCache<MapStore> {
        FirestoreCache::with_store(store, "testcerts", ValueEncoding::Base64)
    }

    #[tokio::test]
    async fn test_put_get_delete_scenario() {
        let cache = cache(MapStore::default());
        let ctx = CacheContext::background();

        cache.put(&ctx, "example.com", b"cert-bytes").await.unwrap();
        assert_eq!(cache.get(&ctx, "example.com").await.unwrap(), b"cert-bytes");
        cache.delete(&ctx, "example.com").await.unwrap();
        assert!(cache.get(&ctx, "example.com").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let cache = cache(MapStore::default());
        cache
            .put(&CacheContext::background(), "example.com", b"cert")
            .await
            .unwrap();

        let docs = cache.store().docs.lock().unwrap();
        let doc = &docs[&("testcerts".to_string(), "example.com".to_string())];
        assert_eq!(doc.fields.len(), 1);
        assert_eq!(doc.string_field(DATA_FIELD), Some("Y2VydA=="));
    }

    #[tokio::test]
    async fn test_overwrite_and_empty_value() {
        let cache = cache(MapStore::default());
        let ctx = CacheContext::background();
        cache.put(&ctx, "k", b"v1").await.unwrap();
        cache.put(&ctx, "k", b"v2").await.unwrap();
        assert_eq!(cache.get(&ctx, "k").await.unwrap(), b"v2");

        cache.put(&ctx, "k", b"").await.unwrap();
        assert_eq!(cache.get(&ctx, "k").await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let cache = cache(MapStore::default());
        cache
            .delete(&CacheContext::background(), "never-written")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_not_found_errors_pass_through() {
        let cache = cache(MapStore::failing(StatusCode::PermissionDenied));
        let ctx = CacheContext::background();

        let err = cache.get(&ctx, "example.com").await.unwrap_err();
        assert!(!err.is_miss());
        assert_eq!(err.status_code(), Some(StatusCode::PermissionDenied));

        let err = cache.put(&ctx, "example.com", b"x").await.unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::PermissionDenied));
    }

    #[tokio::test]
    async fn test_not_found_on_write_is_not_a_miss() {
        let cache = cache(MapStore::failing(StatusCode::NotFound));
        let err = cache
            .put(&CacheContext::background(), "k", b"x")
            .await
            .unwrap_err();
        assert!(!err.is_miss());
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let store = MapStore::default();
        store.docs.lock().unwrap().insert(
            ("testcerts".to_string(), "k".to_string()),
            Document::with_string("other", "x".to_string()),
        );
        let err = cache(store)
            .get(&CacheContext::background(), "k")
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_text_encoding_reads_raw_pem() {
        let store = MapStore::default();
        store.docs.lock().unwrap().insert(
            ("certcache".to_string(), "example.com".to_string()),
            Document::with_string(DATA_FIELD, "-----BEGIN CERTIFICATE-----".to_string()),
        );
        let cache = FirestoreCache::with_store(store, DEFAULT_COLLECTION, ValueEncoding::Text);
        assert_eq!(
            cache.get(&CacheContext::background(), "example.com").await.unwrap(),
            b"-----BEGIN CERTIFICATE-----"
        );
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let cache = cache(MapStore::default());
        let ctx = CacheContext::background();
        for key in ["", "a/b", ".", "..", "__reserved__", "____"] {
            assert!(
                matches!(cache.get(&ctx, key).await, Err(CacheError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
        assert!(cache.get(&ctx, "acme_account+key").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let cache = cache(MapStore::stalling());
        let ctx = CacheContext::background();
        ctx.cancel();
        assert!(matches!(
            cache.get(&ctx, "example.com").await,
            Err(CacheError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_deadline_bounds_stalled_store() {
        let cache = cache(MapStore::stalling());
        let ctx = CacheContext::with_timeout(Duration::from_millis(20));
        assert!(matches!(
            cache.put(&ctx, "example.com", b"x").await,
            Err(CacheError::DeadlineExceeded)
        ));
    }

    #[tokio::test]
    async fn test_connect_against_emulator() {
        let (base, mock) = spawn_mock().await;
        let host = base.trim_start_matches("http://").to_string();
        let config = FirestoreConfig {
            emulator_host: Some(host),
            collection: "testcerts".to_string(),
            ..FirestoreConfig::new("unused.json", "demo-project")
        };

        let cache = FirestoreCache::connect(&config).await.unwrap();
        let ctx = CacheContext::background();
        let der = [0x30u8, 0x82, 0xff, 0x00];

        cache.put(&ctx, "example.com", &der).await.unwrap();
        assert_eq!(cache.get(&ctx, "example.com").await.unwrap(), der);
        assert_eq!(
            mock.document("demo-project/(default)/testcerts/example.com"),
            Some(serde_json::json!({"data": {"stringValue": "MIL/AA=="}}))
        );

        cache.delete(&ctx, "example.com").await.unwrap();
        assert!(cache.get(&ctx, "example.com").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_connect_fails_without_credentials_file() {
        let _env = crate::config::loader::tests::no_emulator_env();
        let config = FirestoreConfig::new("/nonexistent/creds.json", "demo-project");
        assert!(matches!(
            FirestoreCache::connect(&config).await,
            Err(CacheError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_http_deadline_against_slow_store() {
        let (base, _mock) = spawn_mock().await;
        let client = FirestoreClient::new(
            &base,
            "demo-project",
            "(default)",
            Credentials::Emulator,
            Duration::from_secs(60),
        )
        .unwrap();
        let cache = FirestoreCache::with_store(client, "slow", ValueEncoding::Base64);
        let ctx = CacheContext::with_timeout(Duration::from_millis(100));
        assert!(matches!(
            cache.get(&ctx, "example.com").await,
            Err(CacheError::DeadlineExceeded)
        ));
    }
}
