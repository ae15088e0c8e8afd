//! Certificate cache contract and its backends.
//!
//! A certificate manager calls [`CertCache::get`] before issuing, and
//! [`CertCache::put`] once a certificate or account key has been obtained.
//! Backends:
//! - [`FirestoreCache`] (Google Cloud Firestore, persistent)
//! - [`MemoryCache`] (in-process, for tests and layering)
//! - [`Functional`] (three caller-supplied functions, for doubles and decorators)
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! backend = "firestore"  # or "memory"
//!
//! [cache.firestore]
//! credentials_path = "/etc/certcache/service-account.json"
//! project_id = "my-project"
//! collection = "certcache"
//! encoding = "base64"
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = FirestoreCache::connect(&config.cache.firestore).await?;
//! let ctx = CacheContext::with_timeout(Duration::from_secs(10));
//! match cache.get(&ctx, "example.com").await {
//!     Ok(pem) => use_certificate(pem),
//!     Err(e) if e.is_miss() => issue_certificate().await?,
//!     Err(e) => return Err(e.into()),
//! }
//! ```

mod context;
mod error;
pub mod firestore;
mod functional;
mod manager;
mod memory;
mod traits;

pub use context::CacheContext;
pub use error::{CacheError, StatusCode, StoreError};
pub use firestore::{DocumentStore, FirestoreCache, FirestoreClient, ValueEncoding};
pub use functional::{Functional, GetFn, KeyFn, PutValueFn};
pub use manager::CacheManager;
pub use memory::MemoryCache;
pub use traits::CertCache;

// Re-export config types
pub use crate::config::settings::{CacheBackend, CacheConfig, FirestoreConfig};
