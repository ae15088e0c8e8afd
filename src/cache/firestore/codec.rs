//! Byte/text encoding of the stored `data` field.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;

/// How cache values are represented inside the document's text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Standard base64; lossless for any byte sequence.
    #[default]
    Base64,
    /// Bytes stored verbatim as a UTF-8 string. Only PEM-style ASCII data
    /// survives this; it exists to share a collection with writers that
    /// store raw text.
    Text,
}

impl ValueEncoding {
    pub fn encode(&self, data: &[u8]) -> Result<String, CacheError> {
        match self {
            ValueEncoding::Base64 => Ok(STANDARD.encode(data)),
            ValueEncoding::Text => String::from_utf8(data.to_vec()).map_err(|e| {
                CacheError::Serialization(format!(
                    "value is not valid UTF-8 and cannot use text encoding: {e}"
                ))
            }),
        }
    }

    pub fn decode(&self, field: &str) -> Result<Vec<u8>, CacheError> {
        match self {
            ValueEncoding::Base64 => STANDARD
                .decode(field)
                .map_err(|e| CacheError::Serialization(format!("invalid base64 in data field: {e}"))),
            ValueEncoding::Text => Ok(field.as_bytes().to_vec()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueEncoding::Base64 => "base64",
            ValueEncoding::Text => "text",
        }
    }
}

impl FromStr for ValueEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base64" => Ok(ValueEncoding::Base64),
            "text" | "raw" => Ok(ValueEncoding::Text),
            _ => Err(format!(
                "Invalid value encoding '{}'. Valid encodings are: base64, text",
                s
            )),
        }
    }
}

impl fmt::Display for ValueEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
