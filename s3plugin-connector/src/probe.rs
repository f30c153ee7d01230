//! Datasource connectivity test

use crate::lifecycle::{create, destroy};
use crate::storage::ClientFactory;
use s3plugin_core::{DatasourceConfiguration, DatasourceTestResult, PluginError};
use tracing::{debug, info};

/// Action name reported when the probe call fails
pub const PROBE_ACTION: &str = "LIST_BUCKETS";

/// Check that the credentials and region work against the live service.
///
/// Building a client never contacts the service, so one bucket listing is
/// made to force authentication. The throwaway client is destroyed on every
/// path.
pub async fn test_datasource(
    config: &DatasourceConfiguration,
    factory: &dyn ClientFactory,
) -> DatasourceTestResult {
    let handle = match create(config, factory) {
        Ok(handle) => handle,
        Err(e) => return DatasourceTestResult::failure(e.message),
    };

    let probe = match handle.client() {
        Some(client) => client
            .list_buckets()
            .await
            .map_err(|e| PluginError::remote(PROBE_ACTION, e)),
        None => Err(PluginError::stale_connection()),
    };

    destroy(handle).await;

    match probe {
        Ok(buckets) => {
            debug!(buckets = buckets.len(), "Datasource probe listed buckets");
            info!("Datasource test succeeded");
            DatasourceTestResult::success()
        }
        Err(e) => {
            info!(error = %e, "Datasource test failed");
            DatasourceTestResult::failure(e.message)
        }
    }
}
