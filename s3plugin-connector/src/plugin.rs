//! S3 plugin entry points
//!
//! [`S3PluginExecutor`] is what a host talks to. Configuration checks run on
//! the caller's task; anything that builds, uses or tears down a client is
//! handed to the shared I/O pool.

use crate::dispatch;
use crate::lifecycle::{self, ClientHandle};
use crate::pool;
use crate::probe;
use crate::storage::{AwsClientFactory, ClientFactory};
use crate::validation;
use async_trait::async_trait;
use s3plugin_core::{
    ActionConfiguration, ActionExecutionResult, DatasourceConfiguration, DatasourceStructure,
    DatasourceTestResult, PluginError, PluginExecutor,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Plugin executor backed by a [`ClientFactory`]
#[derive(Clone)]
pub struct S3PluginExecutor {
    factory: Arc<dyn ClientFactory>,
}

impl Default for S3PluginExecutor {
    fn default() -> Self {
        Self::new(Arc::new(AwsClientFactory))
    }
}

impl S3PluginExecutor {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl PluginExecutor for S3PluginExecutor {
    type Connection = ClientHandle;

    fn validate_datasource(&self, config: &DatasourceConfiguration) -> BTreeSet<String> {
        validation::validate_datasource(config)
    }

    #[instrument(skip_all)]
    async fn datasource_create(
        &self,
        config: DatasourceConfiguration,
    ) -> Result<ClientHandle, PluginError> {
        let factory = Arc::clone(&self.factory);
        pool::run(async move { lifecycle::create(&config, factory.as_ref()) }).await
    }

    #[instrument(skip_all)]
    async fn datasource_destroy(&self, connection: ClientHandle) {
        let result = pool::run(async move {
            lifecycle::destroy(connection).await;
            Ok(())
        })
        .await;

        if let Err(e) = result {
            warn!(error = %e, "Error destroying S3 connection");
        }
    }

    #[instrument(skip_all)]
    async fn test_datasource(&self, config: DatasourceConfiguration) -> DatasourceTestResult {
        let factory = Arc::clone(&self.factory);
        let result = pool::run(async move {
            Ok(probe::test_datasource(&config, factory.as_ref()).await)
        })
        .await;

        result.unwrap_or_else(|e| DatasourceTestResult::failure(e.message))
    }

    #[instrument(skip_all)]
    async fn execute(
        &self,
        connection: Option<ClientHandle>,
        datasource: Option<DatasourceConfiguration>,
        action: Option<ActionConfiguration>,
    ) -> Result<ActionExecutionResult, PluginError> {
        let (client, operation) =
            dispatch::prepare(connection.as_ref(), datasource.as_ref(), action.as_ref())?;

        info!(action = %operation.action(), bucket = %operation.bucket(), "Executing S3 action");

        let rows =
            pool::run(async move { dispatch::run(client.as_ref(), &operation).await }).await?;

        debug!(rows = rows.len(), "S3 action completed");
        Ok(ActionExecutionResult::success(rows))
    }

    async fn get_structure(
        &self,
        _connection: Option<ClientHandle>,
        _datasource: Option<DatasourceConfiguration>,
    ) -> Result<DatasourceStructure, PluginError> {
        Ok(DatasourceStructure::default())
    }
}
