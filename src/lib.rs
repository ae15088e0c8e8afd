//! certcache
//!
//! Pluggable storage for TLS certificates and account keys obtained by an
//! automatic certificate manager, with a Google Cloud Firestore backend.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;

pub use cache::{CacheContext, CacheError, CertCache};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
