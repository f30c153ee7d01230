//! Storage client traits

use crate::region::Region;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncBufRead;
use tracing::warn;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of an object in a listing
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a bucket listing
#[derive(Debug, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

type ReleaseFn = Box<dyn FnOnce() -> Result<(), StorageError> + Send>;

/// Body of a fetched object.
///
/// Holds the open content stream. The stream is released exactly once, either
/// through [`ObjectContent::close`] or when the value is dropped; a failed
/// release on drop is logged.
pub struct ObjectContent {
    key: String,
    reader: Pin<Box<dyn AsyncBufRead + Send>>,
    release: Option<ReleaseFn>,
}

impl ObjectContent {
    pub fn new(key: impl Into<String>, reader: impl AsyncBufRead + Send + 'static) -> Self {
        Self {
            key: key.into(),
            reader: Box::pin(reader),
            release: None,
        }
    }

    /// Attach a hook that releases the underlying connection
    pub fn with_release(
        mut self,
        release: impl FnOnce() -> Result<(), StorageError> + Send + 'static,
    ) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reader(&mut self) -> &mut Pin<Box<dyn AsyncBufRead + Send>> {
        &mut self.reader
    }

    /// Release the stream now and report the outcome
    pub fn close(mut self) -> Result<(), StorageError> {
        self.release.take().map_or(Ok(()), |release| release())
    }
}

impl Drop for ObjectContent {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            if let Err(e) = release() {
                warn!(key = %self.key, error = %e, "Failed to release object stream");
            }
        }
    }
}

impl std::fmt::Debug for ObjectContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectContent")
            .field("key", &self.key)
            .field("released", &self.release.is_none())
            .finish_non_exhaustive()
    }
}

/// Access and secret key pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    /// Build a credential pair, rejecting keys that could never be valid
    pub fn new(access_key: &str, secret_key: &str) -> Result<Self, StorageError> {
        let malformed =
            |k: &str| k.is_empty() || k.chars().any(|c| c.is_whitespace() || c.is_control());

        if malformed(access_key) {
            return Err(StorageError::Config(
                "access key must be non-empty and contain no whitespace or control characters"
                    .to_string(),
            ));
        }
        if malformed(secret_key) {
            return Err(StorageError::Config(
                "secret key must be non-empty and contain no whitespace or control characters"
                    .to_string(),
            ));
        }

        Ok(Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Remote object storage operations used by the connector
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Fetch one page of object summaries
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, StorageError>;

    /// Open an object's content stream
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent, StorageError>;

    /// Write an object, replacing any existing one, and wait for acknowledgement
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// List bucket names visible to the credentials
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Release pooled connections
    async fn shutdown(&self) -> Result<(), StorageError>;
}

/// Builds storage clients bound to one region and credential pair
pub trait ClientFactory: Send + Sync {
    fn build(
        &self,
        region: Region,
        credentials: Credentials,
        endpoint: Option<&str>,
    ) -> Result<Arc<dyn StorageClient>, StorageError>;
}
