mod local;

pub use local::LocalStore;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A store for opaque blobs keyed by string paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Read an object, returning `None` if it does not exist.
    async fn get_opt(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        match self.get(key).await {
            Ok(data) => Ok(Some(data)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// -- Key helpers --

pub fn report_prefix(lab_id: &str) -> String {
    format!("reports/{lab_id}")
}

pub fn report_tex_key(lab_id: &str, build_id: &str) -> String {
    format!("reports/{lab_id}/{build_id}/report.tex")
}

pub fn report_pdf_key(lab_id: &str, build_id: &str) -> String {
    format!("reports/{lab_id}/{build_id}/report.pdf")
}

pub fn report_meta_key(lab_id: &str, build_id: &str) -> String {
    format!("reports/{lab_id}/{build_id}/report.json")
}

/// Recover the build id from a key produced by [`report_meta_key`].
pub fn build_id_from_meta_key(key: &str) -> Option<&str> {
    let rest = key.strip_prefix("reports/")?;
    let mut parts = rest.split('/');
    let _lab = parts.next()?;
    let build = parts.next()?;
    match (parts.next(), parts.next()) {
        (Some("report.json"), None) => Some(build),
        _ => None,
    }
}

// -- Configuration --

/// Configuration for the object store backend.
pub struct StoreConfig {
    /// Local filesystem base directory. When `None`, the XDG data dir is used.
    pub local_data_dir: Option<String>,
}

// -- Factory --

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store = LocalStore::new(config);
    tracing::debug!("report store at {}", store.base_dir().display());
    Ok(Arc::new(store))
}
