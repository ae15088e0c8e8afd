//! Firestore REST v1 client implementing [`DocumentStore`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;

use crate::cache::firestore::credentials::{Credentials, ServiceAccountKey, TokenSource};
use crate::cache::firestore::document::{Document, DocumentStore};
use crate::cache::{CacheError, FirestoreConfig, StatusCode, StoreError};

/// Environment variable honoured by Google's client libraries for the emulator.
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Long-lived Firestore connection: one pooled HTTP client plus token source.
#[derive(Debug)]
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: Url,
    tokens: TokenSource,
}

impl FirestoreClient {
    /// Build a client from configuration, preferring an emulator when one is
    /// configured or set in `FIRESTORE_EMULATOR_HOST`.
    pub fn from_config(config: &FirestoreConfig) -> Result<Self, CacheError> {
        let (endpoint, credentials) = match config.resolved_emulator_host() {
            Some(host) => (format!("http://{host}"), Credentials::Emulator),
            None => {
                let path = config.credentials_path.as_deref().ok_or_else(|| {
                    CacheError::Connection(
                        "credentials_path is required unless an emulator host is configured"
                            .to_string(),
                    )
                })?;
                let key = ServiceAccountKey::from_file(Path::new(path))?;
                (config.endpoint.clone(), Credentials::ServiceAccount(key))
            }
        };

        Self::new(
            &endpoint,
            &config.project_id,
            &config.database,
            credentials,
            Duration::from_secs(config.request_timeout),
        )
    }

    pub fn new(
        endpoint: &str,
        project_id: &str,
        database: &str,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("certcache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CacheError::Connection(format!("failed to build HTTP client: {e}")))?;

        let mut documents_url = Url::parse(endpoint)
            .map_err(|e| CacheError::Connection(format!("invalid endpoint '{endpoint}': {e}")))?;
        documents_url
            .path_segments_mut()
            .map_err(|_| CacheError::Connection(format!("endpoint '{endpoint}' cannot be a base URL")))?
            .pop_if_empty()
            .extend(["v1", "projects", project_id, "databases", database, "documents"]);

        Ok(Self {
            tokens: TokenSource::new(credentials, http.clone()),
            http,
            documents_url,
        })
    }

    /// Fetch the first access token so unusable credentials fail at startup.
    pub async fn warm_up(&self) -> Result<(), CacheError> {
        self.tokens.bearer().await.map(|_| ())
    }

    pub fn documents_url(&self) -> &Url {
        &self.documents_url
    }

    fn document_url(&self, collection: &str, id: &str) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend([collection, id]);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CacheError> {
        let bearer = self.tokens.bearer().await?;
        let response = request
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }
}

fn transport_error(e: reqwest::Error) -> CacheError {
    if e.is_timeout() {
        StoreError::new(StatusCode::DeadlineExceeded, e.to_string()).into()
    } else {
        CacheError::Connection(e.to_string())
    }
}

/// Turn a non-2xx response into a [`StoreError`], keeping the structured
/// status from the error body when there is one.
async fn status_error(response: Response) -> CacheError {
    let http_status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("HTTP {http_status} (error body unreadable: {e})"),
    };

    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (
            envelope
                .error
                .status
                .as_deref()
                .and_then(StatusCode::from_status_name)
                .unwrap_or_else(|| StatusCode::from_http(http_status)),
            envelope.error.message,
        ),
        Err(_) => (StatusCode::from_http(http_status), body),
    };

    StoreError::new(code, message)
        .with_http_status(http_status)
        .into()
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, CacheError> {
        let url = self.document_url(collection, id);
        let response = self.send(self.http.get(url)).await?;
        response
            .json::<Document>()
            .await
            .map_err(|e| CacheError::Serialization(format!("malformed document {collection}/{id}: {e}")))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
    ) -> Result<(), CacheError> {
        // PATCH without an update mask replaces the whole document.
        let url = self.document_url(collection, id);
        self.send(self.http.patch(url).json(document)).await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CacheError> {
        let url = self.document_url(collection, id);
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
