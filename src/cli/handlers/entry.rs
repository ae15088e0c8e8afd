//! Get, put and delete of a single cache entry.

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::cache::{CacheContext, CacheManager};
use crate::error::{AppError, AppResult};

/// Handler for the commands that touch one key
pub struct EntryCommandHandler {
    cache: CacheManager,
    deadline: Option<Duration>,
}

impl EntryCommandHandler {
    pub fn new(cache: CacheManager, deadline: Option<Duration>) -> Self {
        Self { cache, deadline }
    }

    fn context(&self) -> CacheContext {
        match self.deadline {
            Some(timeout) => CacheContext::with_timeout(timeout),
            None => CacheContext::background(),
        }
    }

    /// Fetch `key` and write it to `output`, or stdout when `None`
    ///
    /// A miss is returned as `AppError::Cache(CacheError::Miss)`; nothing is
    /// written in that case.
    pub async fn get(&self, key: &str, output: Option<&Path>) -> AppResult<()> {
        let data = self.cache.get(&self.context(), key).await?;
        tracing::debug!(key, bytes = data.len(), "cache hit");

        match output {
            Some(path) => tokio::fs::write(path, &data)
                .await
                .map_err(|e| AppError::io(format!("writing {}", path.display()), e)),
            None => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(&data)
                    .await
                    .map_err(|e| AppError::io("writing stdout", e))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| AppError::io("writing stdout", e))
            }
        }
    }

    /// Store the contents of `input`, or stdin when `None`, under `key`
    pub async fn put(&self, key: &str, input: Option<&Path>) -> AppResult<()> {
        let data = match input {
            Some(path) => tokio::fs::read(path)
                .await
                .map_err(|e| AppError::io(format!("reading {}", path.display()), e))?,
            None => {
                let mut buf = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buf)
                    .await
                    .map_err(|e| AppError::io("reading stdin", e))?;
                buf
            }
        };

        self.cache.put(&self.context(), key, &data).await?;
        tracing::info!(key, bytes = data.len(), "stored cache entry");
        Ok(())
    }

    /// Remove `key`; succeeds when it is already absent
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.delete(&self.context(), key).await?;
        tracing::info!(key, "deleted cache entry");
        Ok(())
    }
}
