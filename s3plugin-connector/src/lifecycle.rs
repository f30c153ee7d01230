//! Client handle creation and teardown

use crate::region::Region;
use crate::storage::{ClientFactory, Credentials, StorageClient};
use crate::validation::validate_datasource;
use parking_lot::RwLock;
use s3plugin_core::{DatasourceConfiguration, PluginError};
use std::sync::Arc;
use tracing::{info, warn};

struct HandleInner {
    /// Emptied by [`destroy`]
    client: RwLock<Option<Arc<dyn StorageClient>>>,
    region: Region,
}

/// Live connection to the storage service for one datasource.
///
/// Clones share one client slot. [`destroy`] empties the slot, so every clone
/// reports itself as stale and the client is freed once in-flight calls finish.
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<HandleInner>,
}

impl ClientHandle {
    pub fn new(client: Arc<dyn StorageClient>, region: Region) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                client: RwLock::new(Some(client)),
                region,
            }),
        }
    }

    /// The client, or `None` once the handle is destroyed
    pub fn client(&self) -> Option<Arc<dyn StorageClient>> {
        self.inner.client.read().clone()
    }

    pub fn region(&self) -> Region {
        self.inner.region
    }

    pub fn is_live(&self) -> bool {
        self.inner.client.read().is_some()
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("region", &self.inner.region)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

/// Build a client handle from a datasource configuration
pub fn create(
    config: &DatasourceConfiguration,
    factory: &dyn ClientFactory,
) -> Result<ClientHandle, PluginError> {
    let invalids = validate_datasource(config);
    if !invalids.is_empty() {
        return Err(PluginError::configuration(
            invalids.into_iter().collect::<Vec<_>>().join(" "),
        ));
    }

    let region_name = config.region().unwrap_or_default();
    let region: Region = region_name.parse().map_err(|e| {
        PluginError::configuration(format!(
            "Encountered an error when parsing the S3 instance region from the datasource \
             configuration provided: {e}"
        ))
    })?;

    let auth = config.authentication.clone().unwrap_or_default();
    let credentials = Credentials::new(
        auth.username.as_deref().unwrap_or_default(),
        auth.password.as_deref().unwrap_or_default(),
    )
    .map_err(|e| {
        PluginError::configuration(format!(
            "Encountered an error when parsing AWS credentials from the datasource: {e}"
        ))
    })?;

    let client = factory
        .build(region, credentials, config.endpoint.as_deref())
        .map_err(|e| {
            PluginError::configuration(format!(
                "Encountered an error when connecting to the S3 server: {e}"
            ))
        })?;

    info!(region = %region, "S3 client created");
    Ok(ClientHandle::new(client, region))
}

/// Release a client handle.
///
/// Takes the client out of the handle, marking every clone stale, then shuts
/// it down. Shutdown failures are logged and swallowed.
pub async fn destroy(handle: ClientHandle) {
    let client = handle.inner.client.write().take();
    let Some(client) = client else {
        warn!(region = %handle.region(), "S3 client already destroyed");
        return;
    };

    match client.shutdown().await {
        Ok(()) => info!(region = %handle.region(), "S3 client destroyed"),
        Err(e) => warn!(region = %handle.region(), error = %e, "Error closing S3 connection"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EphemeralClientFactory, EphemeralStorage};
    use s3plugin_core::{DbAuth, ErrorKind, Property};

    fn factory() -> EphemeralClientFactory {
        EphemeralClientFactory::new(Arc::new(EphemeralStorage::new()))
    }

    fn datasource(region: &str) -> DatasourceConfiguration {
        DatasourceConfiguration {
            authentication: Some(DbAuth::new("AKIAEXAMPLE", "secret")),
            properties: vec![Some(Property::new("region", region))],
            endpoint: None,
        }
    }

    #[test]
    fn test_create_handle() {
        let factory = factory();
        let handle = create(&datasource("ap-south-1"), &factory).unwrap();

        assert!(handle.is_live());
        assert_eq!(handle.region().as_str(), "ap-south-1");
        assert_eq!(factory.build_count(), 1);
    }

    #[test]
    fn test_incomplete_configuration_never_builds_client() {
        let factory = factory();
        let mut config = datasource("us-east-1");
        config.authentication = Some(DbAuth::new("", ""));

        let err = create(&config, &factory).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("'Access Key'"));
        assert!(err.message.contains("'Secret Key'"));
        assert_eq!(factory.build_count(), 0);
    }

    #[test]
    fn test_unknown_region() {
        let factory = factory();
        let err = create(&datasource("moon-base-1"), &factory).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("moon-base-1"));
        assert_eq!(factory.build_count(), 0);
    }

    #[test]
    fn test_malformed_credentials() {
        let factory = factory();
        let mut config = datasource("us-east-1");
        config.authentication = Some(DbAuth::new("AKIA EXAMPLE", "secret"));

        let err = create(&config, &factory).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("credentials"));
    }

    #[tokio::test]
    async fn test_destroy_marks_all_clones_stale() {
        let factory = factory();
        let handle = create(&datasource("us-east-1"), &factory).unwrap();
        let clone = handle.clone();

        destroy(handle).await;

        assert!(!clone.is_live());
        assert!(clone.client().is_none());
        assert!(factory.storage().is_shut_down());
    }

    #[tokio::test]
    async fn test_destroy_releases_client_while_clones_remain() {
        let factory = factory();
        let handle = create(&datasource("us-east-1"), &factory).unwrap();
        let clone = handle.clone();
        assert_eq!(Arc::strong_count(factory.storage()), 2);

        destroy(handle).await;

        // only the factory still holds the storage
        assert_eq!(Arc::strong_count(factory.storage()), 1);
        assert!(!clone.is_live());
    }

    #[tokio::test]
    async fn test_destroy_twice_is_harmless() {
        let factory = factory();
        let handle = create(&datasource("us-east-1"), &factory).unwrap();

        destroy(handle.clone()).await;
        destroy(handle).await;
    }
}
