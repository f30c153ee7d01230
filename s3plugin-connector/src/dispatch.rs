//! Action dispatch against a client handle

use crate::action::Operation;
use crate::lifecycle::ClientHandle;
use crate::storage::{StorageClient, StorageError};
use crate::validation::{
    validate_action, MISSING_ACTION_CONFIGURATION, MISSING_DATASOURCE_FIELDS,
};
use bytes::Bytes;
use s3plugin_core::result::{row, Row};
use s3plugin_core::{ActionConfiguration, DatasourceConfiguration, PluginError};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, warn};

pub const LIST_COLUMN: &str = "List of Files";
pub const STATUS_COLUMN: &str = "Action Status";
pub const CONTENT_COLUMN: &str = "File Content";

pub const UPLOAD_SUCCESS: &str = "File uploaded successfully";
pub const DELETE_SUCCESS: &str = "File deleted successfully";

/// Check execution preconditions in order and resolve the client and the
/// operation to run.
///
/// A missing or destroyed handle is reported as a stale connection before
/// anything else is looked at.
pub fn prepare(
    handle: Option<&ClientHandle>,
    datasource: Option<&DatasourceConfiguration>,
    action: Option<&ActionConfiguration>,
) -> Result<(Arc<dyn StorageClient>, Operation), PluginError> {
    let client = handle
        .and_then(ClientHandle::client)
        .ok_or_else(PluginError::stale_connection)?;

    if datasource.is_none() {
        return Err(PluginError::configuration(MISSING_DATASOURCE_FIELDS));
    }
    if action.is_none() {
        return Err(PluginError::configuration(MISSING_ACTION_CONFIGURATION));
    }

    let operation = validate_action(action)?;
    Ok((client, operation))
}

/// Run a validated operation and shape its rows
pub async fn run(
    client: &dyn StorageClient,
    operation: &Operation,
) -> Result<Vec<Row>, PluginError> {
    let action = operation.action();

    let outcome = match operation {
        Operation::List { bucket } => list_all_files(client, bucket)
            .await
            .map(|keys| {
                keys.into_iter()
                    .map(|key| row(LIST_COLUMN, key))
                    .collect::<Vec<_>>()
            }),
        Operation::Upload { bucket, path, body } => {
            upload_file_from_body(client, bucket, path, body)
                .await
                .map(|()| vec![row(STATUS_COLUMN, UPLOAD_SUCCESS)])
        }
        Operation::Read { bucket, path } => read_file(client, bucket, path)
            .await
            .map(|content| vec![row(CONTENT_COLUMN, content)]),
        Operation::Delete { bucket, path } => client
            .delete_object(bucket, path)
            .await
            .map(|()| vec![row(STATUS_COLUMN, DELETE_SUCCESS)]),
    };

    outcome.map_err(|e| {
        error!(action = %action, bucket = %operation.bucket(), error = %e, "S3 action failed");
        PluginError::remote(action.as_str(), e)
    })
}

/// Every key in the bucket, in the order the pages arrive
pub async fn list_all_files(
    client: &dyn StorageClient,
    bucket: &str,
) -> Result<Vec<String>, StorageError> {
    let mut files = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = client.list_objects(bucket, token.as_deref()).await?;
        pages += 1;
        files.extend(page.objects.into_iter().map(|o| o.key));

        if !page.is_truncated {
            break;
        }
        token = page.next_continuation_token;
        if token.is_none() {
            return Err(StorageError::Backend(
                "listing was truncated but no continuation token was returned".to_string(),
            ));
        }
    }

    debug!(bucket = %bucket, pages, files = files.len(), "Listed bucket");
    Ok(files)
}

/// Upload `body` as the object at `path`, replacing any existing object
pub async fn upload_file_from_body(
    client: &dyn StorageClient,
    bucket: &str,
    path: &str,
    body: &str,
) -> Result<(), StorageError> {
    client
        .put_object(bucket, path, Bytes::copy_from_slice(body.as_bytes()))
        .await
}

/// Read an object as text with its line terminators removed.
///
/// Lines are concatenated as read, so `"a\nb"` comes back as `"ab"`. The
/// content stream is released whether or not reading succeeds.
pub async fn read_file(
    client: &dyn StorageClient,
    bucket: &str,
    path: &str,
) -> Result<String, StorageError> {
    let mut content = client.get_object(bucket, path).await?;
    let text = read_joined_lines(content.reader()).await;

    if let Err(e) = content.close() {
        warn!(
            bucket = %bucket,
            key = %path,
            error = %e,
            "Error closing object stream after reading file"
        );
    }

    Ok(text?)
}

async fn read_joined_lines<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut text = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        // '\r' alone also ends a line
        text.extend(
            String::from_utf8_lossy(&line)
                .chars()
                .filter(|c| *c != '\n' && *c != '\r'),
        );
    }

    Ok(text)
}
