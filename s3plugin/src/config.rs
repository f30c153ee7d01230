//! Configuration management

use s3plugin_connector::IoPoolConfig;
use s3plugin_core::{DatasourceConfiguration, DbAuth, Property};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub datasource: DatasourceSettings,

    #[serde(default)]
    pub pool: PoolSettings,
}

/// Connection settings for one S3 datasource
#[derive(Deserialize, Default)]
pub struct DatasourceSettings {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for DatasourceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasourceSettings")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
        }
    }
}

fn default_worker_threads() -> usize {
    s3plugin_connector::pool::DEFAULT_WORKER_THREADS
}

impl Settings {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `s3plugin.toml` in the working
    /// directory is read if present. `S3PLUGIN__DATASOURCE__REGION` style
    /// variables override file values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("s3plugin").required(false),
        };

        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("S3PLUGIN")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        Ok(builder.build()?.try_deserialize::<Settings>()?)
    }

    pub fn pool_config(&self) -> IoPoolConfig {
        IoPoolConfig {
            worker_threads: self.pool.worker_threads,
            ..IoPoolConfig::default()
        }
    }
}

impl DatasourceSettings {
    /// Shape the settings the way the host would submit them
    pub fn to_datasource_configuration(&self) -> DatasourceConfiguration {
        DatasourceConfiguration {
            authentication: Some(DbAuth {
                username: self.access_key.clone(),
                password: self.secret_key.clone(),
            }),
            properties: vec![Some(Property {
                key: Some("region".to_string()),
                value: self.region.clone(),
            })],
            endpoint: self.endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> Settings {
        Settings::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_toml("");
        assert!(settings.datasource.access_key.is_none());
        assert_eq!(settings.pool.worker_threads, 32);
    }

    #[test]
    fn test_file_values() {
        let settings = from_toml(
            r#"
            [datasource]
            access_key = "AKIAEXAMPLE"
            secret_key = "secret"
            region = "eu-west-1"
            endpoint = "http://localhost:4566"

            [pool]
            worker_threads = 4
            "#,
        );

        assert_eq!(settings.datasource.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.pool_config().worker_threads, 4);
        assert_eq!(settings.pool_config().thread_name, "s3plugin-io");
    }

    #[test]
    fn test_datasource_configuration_positions() {
        let settings = from_toml(
            r#"
            [datasource]
            access_key = "AKIAEXAMPLE"
            region = "us-west-2"
            "#,
        );

        let config = settings.datasource.to_datasource_configuration();
        assert_eq!(config.region(), Some("us-west-2"));
        let auth = config.authentication.unwrap();
        assert_eq!(auth.username.as_deref(), Some("AKIAEXAMPLE"));
        assert!(auth.password.is_none());
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let settings = from_toml(
            r#"
            [datasource]
            secret_key = "hunter2"
            "#,
        );
        assert!(!format!("{:?}", settings.datasource).contains("hunter2"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/s3plugin.toml"))).is_err());
    }
}
