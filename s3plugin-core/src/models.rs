//! Datasource and action configuration supplied by the host

use serde::{Deserialize, Serialize};

/// A single key/value entry of a configuration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

/// Username/password authentication block.
///
/// For object storage the username carries the access key and the password
/// carries the secret key.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbAuth {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DbAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

impl std::fmt::Debug for DbAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Connection settings for one datasource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceConfiguration {
    #[serde(default)]
    pub authentication: Option<DbAuth>,
    #[serde(default)]
    pub properties: Vec<Option<Property>>,
    /// Custom endpoint of an S3-compatible service
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl DatasourceConfiguration {
    /// Position of the region identifier in `properties`
    pub const REGION_PROPERTY_INDEX: usize = 0;

    pub fn region(&self) -> Option<&str> {
        property_value(&self.properties, Self::REGION_PROPERTY_INDEX)
    }
}

/// Parameters of one query execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfiguration {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub plugin_specified_templates: Vec<Option<Property>>,
}

impl ActionConfiguration {
    /// Position of the action identifier in `plugin_specified_templates`
    pub const ACTION_PROPERTY_INDEX: usize = 0;
    /// Position of the bucket name in `plugin_specified_templates`
    pub const BUCKET_NAME_PROPERTY_INDEX: usize = 1;

    pub fn action(&self) -> Option<&str> {
        property_value(&self.plugin_specified_templates, Self::ACTION_PROPERTY_INDEX)
    }

    pub fn bucket_name(&self) -> Option<&str> {
        property_value(
            &self.plugin_specified_templates,
            Self::BUCKET_NAME_PROPERTY_INDEX,
        )
    }
}

/// Value of the property at `index`, if both the slot and its value are set
pub fn property_value(properties: &[Option<Property>], index: usize) -> Option<&str> {
    properties
        .get(index)
        .and_then(Option::as_ref)
        .and_then(|p| p.value.as_deref())
}

/// True for `None`, the empty string and whitespace-only strings
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
