//! S3 connector for the plugin host
//!
//! This crate implements [`PluginExecutor`](s3plugin_core::PluginExecutor) for
//! Amazon S3 and S3-compatible services: list, upload, read and delete objects
//! in a bucket.

pub mod action;
pub mod dispatch;
pub mod lifecycle;
pub mod plugin;
pub mod pool;
pub mod probe;
pub mod region;
pub mod storage;
pub mod validation;


pub use action::{Operation, S3Action};
pub use lifecycle::ClientHandle;
pub use plugin::S3PluginExecutor;
pub use pool::{IoPoolConfig, PoolError};
pub use region::Region;
