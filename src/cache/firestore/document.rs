//! Document model and the store seam the cache backend talks to.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;

/// A typed Firestore field value, in REST wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// Base64 text, as Firestore transports bytes.
    BytesValue(String),
    /// Int64 values travel as decimal strings.
    IntegerValue(String),
    BooleanValue(bool),
    DoubleValue(f64),
    TimestampValue(String),
}

/// A document: a flat map of named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn with_string(field: &str, value: String) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), Value::StringValue(value));
        Self { fields }
    }

    pub fn string_field(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::StringValue(s)) => Some(s),
            _ => None,
        }
    }
}

/// Collection/document storage.
///
/// `get_document` must report a missing document as a [`CacheError::Store`]
/// whose code is `NotFound`. `set_document` replaces the whole document,
/// creating it if needed. `delete_document` succeeds for missing documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, CacheError>;

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
    ) -> Result<(), CacheError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CacheError>;
}
