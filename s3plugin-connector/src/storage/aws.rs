//! Storage client backed by the AWS SDK

use super::traits::*;
use crate::region::Region;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Region as SdkRegion};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::DateTime;
use std::sync::Arc;
use tracing::debug;

/// Provider name attached to static credentials
const CREDENTIALS_PROVIDER_NAME: &str = "s3plugin-datasource";

fn map_sdk_error<E>(err: SdkError<E>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageError::Backend(DisplayErrorContext(&err).to_string())
}

/// S3 client bound to one region and credential pair
pub struct AwsStorageClient {
    client: Client,
    region: Region,
}

impl AwsStorageClient {
    pub fn new(region: Region, credentials: &Credentials, endpoint: Option<&str>) -> Self {
        let sdk_credentials = aws_sdk_s3::config::Credentials::new(
            credentials.access_key(),
            credentials.secret_key(),
            None, // session token
            None, // expiration
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(SdkRegion::new(region.as_str()))
            .credentials_provider(sdk_credentials);

        // S3-compatible services generally need path-style addressing
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            region,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

#[async_trait]
impl StorageClient for AwsStorageClient {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, StorageError> {
        let mut request = self.client.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let output = request.send().await.map_err(map_sdk_error)?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectSummary {
                    key: key.to_string(),
                    size: object
                        .size()
                        .and_then(|size| u64::try_from(size).ok())
                        .unwrap_or_default(),
                    last_modified: object
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                })
            })
            .collect();

        Ok(ObjectListing {
            objects,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;

        // Dropping the body hands the connection back to the pool
        Ok(ObjectContent::new(key, output.body.into_async_read()))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StorageError> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(map_sdk_error)?;

        debug!(bucket = %bucket, key = %key, size, "Upload acknowledged");
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn shutdown(&self) -> Result<(), StorageError> {
        // The SDK client has no explicit close; its pool goes with the last clone
        debug!(region = %self.region, "Releasing S3 client");
        Ok(())
    }
}

/// Builds [`AwsStorageClient`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsClientFactory;

impl ClientFactory for AwsClientFactory {
    fn build(
        &self,
        region: Region,
        credentials: Credentials,
        endpoint: Option<&str>,
    ) -> Result<Arc<dyn StorageClient>, StorageError> {
        let endpoint = endpoint.map(str::trim).filter(|e| !e.is_empty());
        if let Some(endpoint) = endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| StorageError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        }

        let client: Arc<dyn StorageClient> =
            Arc::new(AwsStorageClient::new(region, &credentials, endpoint));
        Ok(client)
    }
}
