//! Cache backend assembled from caller-supplied functions.
//!
//! Handy for test doubles and decorators: a `get` that always returns
//! [`CacheError::Miss`] simulates a cold cache, and closures that record their
//! arguments let tests assert on what a certificate manager asked for.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::cache::{CacheContext, CacheError, CertCache};

pub type GetFn =
    Arc<dyn Fn(CacheContext, String) -> BoxFuture<'static, Result<Vec<u8>, CacheError>> + Send + Sync>;

pub type KeyFn =
    Arc<dyn Fn(CacheContext, String) -> BoxFuture<'static, Result<(), CacheError>> + Send + Sync>;

pub type PutValueFn = Arc<
    dyn Fn(CacheContext, String, Vec<u8>) -> BoxFuture<'static, Result<(), CacheError>>
        + Send
        + Sync,
>;

#[derive(Clone)]
enum PutFn {
    /// Receives only the context and key; the value never reaches it.
    KeyOnly(KeyFn),
    WithValue(PutValueFn),
}

/// A [`CertCache`] whose operations delegate straight to three functions.
///
/// The adapter adds no logging, validation or error translation: each call
/// returns exactly what the corresponding function returns.
#[derive(Clone)]
pub struct Functional {
    get: GetFn,
    put: PutFn,
    del: KeyFn,
}

impl Functional {
    /// Build from `get`, `put` and `delete` functions.
    ///
    /// `put` is called with the context and key only. A decorator that needs
    /// the stored bytes must capture them itself or use
    /// [`Functional::with_value_put`].
    pub fn new<G, GFut, P, PFut, D, DFut>(get: G, put: P, delete: D) -> Self
    where
        G: Fn(CacheContext, String) -> GFut + Send + Sync + 'static,
        GFut: Future<Output = Result<Vec<u8>, CacheError>> + Send + 'static,
        P: Fn(CacheContext, String) -> PFut + Send + Sync + 'static,
        PFut: Future<Output = Result<(), CacheError>> + Send + 'static,
        D: Fn(CacheContext, String) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = Result<(), CacheError>> + Send + 'static,
    {
        Self {
            get: Arc::new(move |ctx, key| get(ctx, key).boxed()),
            put: PutFn::KeyOnly(Arc::new(move |ctx, key| put(ctx, key).boxed())),
            del: Arc::new(move |ctx, key| delete(ctx, key).boxed()),
        }
    }

    /// Like [`Functional::new`], but `put` also receives the value.
    pub fn with_value_put<G, GFut, P, PFut, D, DFut>(get: G, put: P, delete: D) -> Self
    where
        G: Fn(CacheContext, String) -> GFut + Send + Sync + 'static,
        GFut: Future<Output = Result<Vec<u8>, CacheError>> + Send + 'static,
        P: Fn(CacheContext, String, Vec<u8>) -> PFut + Send + Sync + 'static,
        PFut: Future<Output = Result<(), CacheError>> + Send + 'static,
        D: Fn(CacheContext, String) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = Result<(), CacheError>> + Send + 'static,
    {
        Self {
            get: Arc::new(move |ctx, key| get(ctx, key).boxed()),
            put: PutFn::WithValue(Arc::new(move |ctx, key, data| put(ctx, key, data).boxed())),
            del: Arc::new(move |ctx, key| delete(ctx, key).boxed()),
        }
    }

    /// A cache that never holds anything: every `get` misses, writes succeed.
    pub fn cold() -> Self {
        Self::new(
            |_, _| async { Err::<Vec<u8>, _>(CacheError::Miss) },
            |_, _| async { Ok::<_, CacheError>(()) },
            |_, _| async { Ok::<_, CacheError>(()) },
        )
    }

    /// Whether `put` forwards the value to the supplied function.
    pub fn forwards_put_value(&self) -> bool {
        matches!(self.put, PutFn::WithValue(_))
    }
}

impl fmt::Debug for Functional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Functional")
            .field("forwards_put_value", &self.forwards_put_value())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CertCache for Functional {
    async fn get(&self, ctx: &CacheContext, key: &str) -> Result<Vec<u8>, CacheError> {
        (self.get)(ctx.clone(), key.to_string()).await
    }

    async fn put(&self, ctx: &CacheContext, key: &str, data: &[u8]) -> Result<(), CacheError> {
        match &self.put {
            PutFn::KeyOnly(put) => put(ctx.clone(), key.to_string()).await,
            PutFn::WithValue(put) => put(ctx.clone(), key.to_string(), data.to_vec()).await,
        }
    }

    async fn delete(&self, ctx: &CacheContext, key: &str) -> Result<(), CacheError> {
        (self.del)(ctx.clone(), key.to_string()).await
    }
}
