//! In-memory ephemeral storage backend

use super::traits::*;
use crate::region::Region;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Page size used when none is configured, matching S3's default
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory stored object
struct InMemoryObject {
    data: Bytes,
    last_modified: chrono::DateTime<Utc>,
}

/// In-memory bucket
struct InMemoryBucket {
    objects: DashMap<String, InMemoryObject>,
}

impl InMemoryBucket {
    fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }
}

/// Ephemeral (in-memory) storage backend.
///
/// Lists keys in lexicographic order, `page_size` keys per page, and keeps
/// counters that let callers observe how it was used.
pub struct EphemeralStorage {
    buckets: DashMap<String, Arc<InMemoryBucket>>,
    page_size: usize,
    requests: AtomicUsize,
    open_streams: Arc<AtomicUsize>,
    shut_down: AtomicBool,
}

impl Default for EphemeralStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemeralStorage {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: DashMap::new(),
            page_size: page_size.max(1),
            requests: AtomicUsize::new(0),
            open_streams: Arc::new(AtomicUsize::new(0)),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Create a bucket; returns false if it already existed
    pub fn create_bucket(&self, bucket: &str) -> bool {
        if self.buckets.contains_key(bucket) {
            return false;
        }
        self.buckets
            .insert(bucket.to_string(), Arc::new(InMemoryBucket::new()));
        true
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    /// Raw bytes of an object, bypassing request accounting
    pub fn object_data(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).map(|o| o.data.clone()))
    }

    /// Number of storage calls served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of object streams opened and not yet released
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn bucket(&self, bucket: &str) -> Result<Arc<InMemoryBucket>, StorageError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.buckets
            .get(bucket)
            .map(|b| Arc::clone(b.value()))
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))
    }
}

#[async_trait]
impl StorageClient for EphemeralStorage {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        let mut objects: Vec<ObjectSummary> = bucket_ref
            .objects
            .iter()
            .filter(|entry| continuation_token.map_or(true, |token| entry.key().as_str() > token))
            .map(|entry| ObjectSummary {
                key: entry.key().clone(),
                size: entry.data.len() as u64,
                last_modified: Some(entry.last_modified),
            })
            .collect();

        objects.sort_by(|a, b| a.key.cmp(&b.key));

        let is_truncated = objects.len() > self.page_size;
        objects.truncate(self.page_size);
        let next_continuation_token = if is_truncated {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        debug!(bucket = %bucket, count = objects.len(), is_truncated, "Listed objects page");

        Ok(ObjectListing {
            objects,
            is_truncated,
            next_continuation_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent, StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        let data = bucket_ref
            .objects
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        let open_streams = Arc::clone(&self.open_streams);
        open_streams.fetch_add(1, Ordering::SeqCst);

        Ok(
            ObjectContent::new(key, std::io::Cursor::new(data)).with_release(move || {
                open_streams.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }),
        )
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StorageError> {
        let bucket_ref = self.bucket(bucket)?;

        debug!(bucket = %bucket, key = %key, size = data.len(), "Stored object");
        bucket_ref.objects.insert(
            key.to_string(),
            InMemoryObject {
                data,
                last_modified: Utc::now(),
            },
        );

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let bucket_ref = self.bucket(bucket)?;
        // S3 reports success for missing keys too
        bucket_ref.objects.remove(key);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut names: Vec<String> = self.buckets.iter().map(|r| r.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn shutdown(&self) -> Result<(), StorageError> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one shared [`EphemeralStorage`] for every datasource
pub struct EphemeralClientFactory {
    storage: Arc<EphemeralStorage>,
    builds: AtomicUsize,
}

impl EphemeralClientFactory {
    pub fn new(storage: Arc<EphemeralStorage>) -> Self {
        Self {
            storage,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn storage(&self) -> &Arc<EphemeralStorage> {
        &self.storage
    }

    /// Number of clients built so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl ClientFactory for EphemeralClientFactory {
    fn build(
        &self,
        region: Region,
        credentials: Credentials,
        _endpoint: Option<&str>,
    ) -> Result<Arc<dyn StorageClient>, StorageError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        debug!(
            region = %region,
            access_key = %credentials.access_key(),
            "Building ephemeral client"
        );
        let client: Arc<dyn StorageClient> = self.storage.clone();
        Ok(client)
    }
}
