//! Core types and traits for the S3 plugin
//!
//! This crate holds the contract shared between a host and the connector:
//! configuration models, result shapes, the error taxonomy and the
//! [`PluginExecutor`] trait.

pub mod error;
pub mod models;
pub mod plugin;
pub mod result;

pub use error::{ErrorKind, PluginError};
pub use models::{ActionConfiguration, DatasourceConfiguration, DbAuth, Property};
pub use plugin::PluginExecutor;
pub use result::{ActionExecutionResult, DatasourceStructure, DatasourceTestResult, Row};
