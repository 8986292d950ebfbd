//! HTTP client for the object storage service.
//!
//! Receipts and catalog images live in an S3-style bucket behind a small
//! HTTP API: `PUT /objects/{key}` with a bearer token stores a blob,
//! `DELETE /objects/{key}` removes it. Public reads go through
//! `public_base_url`, which fronts the bucket with a CDN.

use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Errors from object storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Network-level failure talking to the storage API.
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage API answered with a non-success status.
    #[error("storage API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A successfully stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Public URL the object is served from.
    pub url: String,
    /// Storage key, used for later deletion.
    pub external_id: String,
}

struct ObjectStoreInner {
    client: reqwest::Client,
    endpoint: String,
    access_key: String,
    public_base_url: String,
}

/// Client for the object storage API. Cheap to clone.
#[derive(Clone)]
pub struct ObjectStore {
    inner: Arc<ObjectStoreInner>,
}

impl ObjectStore {
    /// Create a new storage client.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            inner: Arc::new(ObjectStoreInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                access_key: config.access_key.expose_secret().to_string(),
                public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Build a collision-free key under `prefix`, keeping the original
    /// file extension when there is one.
    #[must_use]
    pub fn object_key(prefix: &str, filename: &str) -> String {
        let date = Utc::now().format("%Y%m%d");
        let id = Uuid::new_v4();
        match filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && ext.len() <= 8 => {
                format!("{prefix}/{date}-{id}.{}", ext.to_ascii_lowercase())
            }
            _ => format!("{prefix}/{date}-{id}"),
        }
    }

    /// Upload a blob under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Request` on network failure or `Api` when the
    /// storage service rejects the upload.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let response = self
            .inner
            .client
            .put(format!("{}/objects/{key}", self.inner.endpoint))
            .bearer_auth(&self.inner.access_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, body });
        }

        Ok(StoredObject {
            url: format!("{}/{key}", self.inner.public_base_url),
            external_id: key.to_string(),
        })
    }

    /// Delete the object stored under `key`. Missing objects are treated
    /// as already deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Request` on network failure or `Api` when the
    /// storage service rejects the delete.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .inner
            .client
            .delete(format!("{}/objects/{key}", self.inner.endpoint))
            .bearer_auth(&self.inner.access_key)
            .send()
            .await?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        let key = ObjectStore::object_key("receipts", "virement.PDF");
        assert!(key.starts_with("receipts/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = ObjectStore::object_key("receipts", "scan");
        assert!(key.starts_with("receipts/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_object_keys_are_unique() {
        let a = ObjectStore::object_key("images", "photo.jpg");
        let b = ObjectStore::object_key("images", "photo.jpg");
        assert_ne!(a, b);
    }
}
