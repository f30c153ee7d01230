//! Plugin error taxonomy and formatting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of failure a plugin can report to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing, blank or malformed configuration supplied by the user
    #[serde(rename = "CONFIGURATION_ERROR")]
    Configuration,
    /// No live client handle exists for the datasource
    #[serde(rename = "STALE_CONNECTION")]
    StaleConnection,
    /// The storage backend rejected or failed a call
    #[serde(rename = "REMOTE_OPERATION_ERROR")]
    RemoteOperation,
    /// A state validation should have prevented
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::StaleConnection => "STALE_CONNECTION",
            Self::RemoteOperation => "REMOTE_OPERATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Whether the host should re-create the datasource and try again.
    ///
    /// The plugin itself never retries.
    pub fn is_retryable_by_host(&self) -> bool {
        matches!(self, Self::StaleConnection)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned across the plugin boundary
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PluginError {
    pub kind: ErrorKind,
    pub message: String,
    /// Action that was executing when a remote call failed
    pub action: Option<String>,
}

impl PluginError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn stale_connection() -> Self {
        Self::new(
            ErrorKind::StaleConnection,
            "The connection to the storage service is no longer available. \
             Re-create the datasource and try again.",
        )
    }

    /// Wrap a backend failure together with the action that triggered it
    pub fn remote(action: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let action = action.into();
        Self {
            kind: ErrorKind::RemoteOperation,
            message: format!("Query execution failed when executing action: {action} : {cause}"),
            action: Some(action),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Format as the JSON error envelope handed to the host
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct JsonError<'a> {
            error_type: &'static str,
            message: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            action: Option<&'a str>,
        }

        let error = JsonError {
            error_type: self.kind.as_str(),
            message: &self.message,
            action: self.action.as_deref(),
        };

        serde_json::to_string(&error).unwrap_or_else(|_| {
            format!(
                r#"{{"errorType":"{}","message":"{}"}}"#,
                self.kind.as_str(),
                self.message.replace('"', "'")
            )
        })
    }
}
