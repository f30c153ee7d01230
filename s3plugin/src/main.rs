//! s3plugin - S3 datasource plugin runner
//!
//! Drives the S3 connector the way a plugin host would: validate a datasource,
//! test its connectivity, or run a single action. Results are printed to stdout
//! as JSON; logs go to stderr.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use s3plugin_connector::{pool, S3PluginExecutor};
use s3plugin_core::{ActionConfiguration, ActionExecutionResult, PluginExecutor, Property};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "s3plugin")]
#[command(about = "Run S3 datasource actions", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./s3plugin.toml if present)
    #[arg(short, long, env = "S3PLUGIN_CONFIG")]
    config: Option<PathBuf>,

    /// AWS access key
    #[arg(long)]
    access_key: Option<String>,

    /// AWS secret key
    #[arg(long)]
    secret_key: Option<String>,

    /// Region the bucket lives in
    #[arg(long)]
    region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[arg(long)]
    endpoint: Option<String>,

    /// Worker threads for the I/O pool
    #[arg(long, env = "S3PLUGIN_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "S3PLUGIN_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the datasource settings without contacting S3
    Validate,

    /// Check that the credentials and region work
    Test,

    /// Run one action against a bucket
    Exec {
        /// LIST, UPLOAD_FILE_FROM_BODY, READ_FILE or DELETE_FILE
        #[arg(long)]
        action: String,

        #[arg(long)]
        bucket: String,

        /// Object key for single-file actions
        #[arg(long)]
        path: Option<String>,

        /// Content to upload
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the content to upload from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("s3plugin={0},s3plugin_connector={0}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = config::Settings::load(args.config.as_deref())?;
    if let Some(access_key) = args.access_key {
        settings.datasource.access_key = Some(access_key);
    }
    if let Some(secret_key) = args.secret_key {
        settings.datasource.secret_key = Some(secret_key);
    }
    if let Some(region) = args.region {
        settings.datasource.region = Some(region);
    }
    if let Some(endpoint) = args.endpoint {
        settings.datasource.endpoint = Some(endpoint);
    }
    if let Some(worker_threads) = args.worker_threads {
        settings.pool.worker_threads = worker_threads;
    }
    debug!(?settings, "Loaded settings");

    pool::init(&settings.pool_config())?;

    let executor = S3PluginExecutor::default();
    let datasource = settings.datasource.to_datasource_configuration();

    match args.command {
        Command::Validate => {
            let invalids = executor.validate_datasource(&datasource);
            print_json(&invalids)?;
            Ok(if invalids.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Test => {
            let result = executor.test_datasource(datasource).await;
            print_json(&result)?;
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Exec {
            action,
            bucket,
            path,
            body,
            body_file,
        } => {
            let body = match body_file {
                Some(file) => Some(
                    tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("reading {}", file.display()))?,
                ),
                None => body,
            };

            let action = ActionConfiguration {
                path,
                body,
                plugin_specified_templates: vec![
                    Some(Property::new("action", action)),
                    Some(Property::new("bucketName", bucket)),
                ],
            };

            let created = executor.datasource_create(datasource.clone()).await;
            let result: ActionExecutionResult = match created {
                Ok(handle) => {
                    let result = executor
                        .execute(Some(handle.clone()), Some(datasource), Some(action))
                        .await;
                    executor.datasource_destroy(handle).await;
                    result.into()
                }
                Err(e) => ActionExecutionResult::from_error(&e),
            };

            info!(success = result.is_execution_success, "Action finished");
            print_json(&result)?;
            Ok(if result.is_execution_success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
