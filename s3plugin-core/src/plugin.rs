//! Host-facing plugin contract

use crate::error::PluginError;
use crate::models::{ActionConfiguration, DatasourceConfiguration};
use crate::result::{ActionExecutionResult, DatasourceStructure, DatasourceTestResult};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Lifecycle hooks a host calls on a datasource plugin.
///
/// The host orchestrates the sequence `datasource_create`, any number of
/// `execute` calls, then `datasource_destroy`. Executing with a connection that
/// is absent or already destroyed is reported as
/// [`ErrorKind::StaleConnection`](crate::ErrorKind::StaleConnection).
#[async_trait]
pub trait PluginExecutor: Send + Sync {
    /// Live connection produced by `datasource_create`
    type Connection: Send + Sync;

    /// Check configuration completeness without touching the network.
    ///
    /// An empty set means the configuration is valid.
    fn validate_datasource(&self, config: &DatasourceConfiguration) -> BTreeSet<String>;

    /// Build a connection for a datasource
    async fn datasource_create(
        &self,
        config: DatasourceConfiguration,
    ) -> Result<Self::Connection, PluginError>;

    /// Release a connection; failures are logged, never returned
    async fn datasource_destroy(&self, connection: Self::Connection);

    /// Verify credentials and region against the live service
    async fn test_datasource(&self, config: DatasourceConfiguration) -> DatasourceTestResult;

    /// Run one action
    async fn execute(
        &self,
        connection: Option<Self::Connection>,
        datasource: Option<DatasourceConfiguration>,
        action: Option<ActionConfiguration>,
    ) -> Result<ActionExecutionResult, PluginError>;

    async fn get_structure(
        &self,
        connection: Option<Self::Connection>,
        datasource: Option<DatasourceConfiguration>,
    ) -> Result<DatasourceStructure, PluginError>;
}
