//! Result shapes returned to the host

use crate::error::{ErrorKind, PluginError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of an action result
pub type Row = BTreeMap<String, String>;

/// Build a single-column row
pub fn row(column: &str, value: impl Into<String>) -> Row {
    let mut row = Row::new();
    row.insert(column.to_string(), value.into());
    row
}

/// Outcome of one action execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecutionResult {
    pub body: serde_json::Value,
    pub is_execution_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionExecutionResult {
    /// Successful result carrying `rows` in order
    pub fn success(rows: Vec<Row>) -> Self {
        let body = serde_json::Value::Array(
            rows.into_iter()
                .map(|row| {
                    serde_json::Value::Object(
                        row.into_iter()
                            .map(|(k, v)| (k, serde_json::Value::String(v)))
                            .collect(),
                    )
                })
                .collect(),
        );

        Self {
            body,
            is_execution_success: true,
            error_kind: None,
            message: None,
        }
    }

    /// The uniform failure shape for any plugin error
    pub fn from_error(error: &PluginError) -> Self {
        Self {
            body: serde_json::Value::Null,
            is_execution_success: false,
            error_kind: Some(error.kind),
            message: Some(error.message.clone()),
        }
    }

    /// Rows of a successful result, in order
    pub fn rows(&self) -> Vec<Row> {
        self.body
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(serde_json::Value::as_object)
                    .map(|obj| {
                        obj.iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Result<ActionExecutionResult, PluginError>> for ActionExecutionResult {
    fn from(result: Result<ActionExecutionResult, PluginError>) -> Self {
        result.unwrap_or_else(|e| Self::from_error(&e))
    }
}

/// Outcome of a datasource connectivity test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceTestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DatasourceTestResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// A table exposed to the host's structure browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
}

/// Browsable structure of a datasource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceStructure {
    pub tables: Vec<Table>,
}

impl DatasourceStructure {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
