//! Configuration checks run before any network call

use crate::action::{Operation, S3Action};
use s3plugin_core::models::is_blank;
use s3plugin_core::{ActionConfiguration, DatasourceConfiguration, PluginError};
use std::collections::BTreeSet;

pub const MISSING_DATASOURCE_FIELDS: &str = "At least one of the mandatory fields in S3 datasource \
     creation form is empty - 'Access Key'/'Secret Key'/'Region'. Please fill all the mandatory \
     fields and try again.";

pub const MISSING_ACCESS_KEY: &str = "Mandatory parameter 'Access Key' is empty. Did you forget to \
     edit the 'Access Key' field in the datasource creation form? You need to fill it with your \
     AWS Access Key.";

pub const MISSING_SECRET_KEY: &str = "Mandatory parameter 'Secret Key' is empty. Did you forget to \
     edit the 'Secret Key' field in the datasource creation form? You need to fill it with your \
     AWS Secret Key.";

pub const MISSING_REGION: &str = "Mandatory parameter 'Region' is empty. Did you forget to edit \
     the 'Region' field in the datasource creation form? You need to fill it with the region where \
     your AWS instance is hosted.";

pub const MISSING_ACTION_CONFIGURATION: &str = "At least one of the mandatory fields in S3 query \
     creation form is empty - 'Action'/'Bucket Name'/'File Path'/'Content'. Please fill all the \
     mandatory fields and try again.";

pub const MISSING_TEMPLATES: &str = "Mandatory parameters 'Action' and 'Bucket Name' are missing. \
     Did you forget to edit the 'Action' and 'Bucket Name' fields in the query form?";

pub const MISSING_ACTION: &str = "Mandatory parameter 'Action' is missing. Did you forget to \
     select one of the actions from the Action dropdown?";

pub const MISSING_PATH: &str = "Required parameter 'File Path' is missing. Did you forget to edit \
     the 'File Path' field in the query form? This field cannot be left empty with the chosen \
     action.";

pub const MISSING_BUCKET: &str = "Mandatory parameter 'Bucket Name' is missing. Did you forget to \
     edit the 'Bucket Name' field in the query form?";

pub const MISSING_BODY: &str = "Mandatory parameter 'Content' is missing. Did you forget to edit \
     the 'Content' field in the query form?";

/// Collect every problem with a datasource configuration.
///
/// Each check runs independently; an empty set means the configuration is
/// complete. The region is only checked for presence here.
pub fn validate_datasource(config: &DatasourceConfiguration) -> BTreeSet<String> {
    let mut invalids = BTreeSet::new();

    match &config.authentication {
        None => {
            invalids.insert(MISSING_DATASOURCE_FIELDS.to_string());
        }
        Some(auth) => {
            if is_blank(auth.username.as_deref()) {
                invalids.insert(MISSING_ACCESS_KEY.to_string());
            }
            if is_blank(auth.password.as_deref()) {
                invalids.insert(MISSING_SECRET_KEY.to_string());
            }
        }
    }

    if is_blank(config.region()) {
        invalids.insert(MISSING_REGION.to_string());
    }

    invalids
}

/// Check an action configuration and turn it into an [`Operation`].
///
/// Checks run in form order and stop at the first failure.
pub fn validate_action(config: Option<&ActionConfiguration>) -> Result<Operation, PluginError> {
    let config =
        config.ok_or_else(|| PluginError::configuration(MISSING_ACTION_CONFIGURATION))?;

    if config.plugin_specified_templates.is_empty() {
        return Err(PluginError::configuration(MISSING_TEMPLATES));
    }

    let identifier = config
        .action()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| PluginError::configuration(MISSING_ACTION))?;

    let action: S3Action = identifier.trim().parse().map_err(|()| {
        PluginError::configuration(format!(
            "Unsupported action '{identifier}'. Please select one of the actions from the \
             Action dropdown: LIST, UPLOAD_FILE_FROM_BODY, READ_FILE, DELETE_FILE."
        ))
    })?;

    let path = config.path.as_deref();
    if action.requires_path() && is_blank(path) {
        return Err(PluginError::configuration(MISSING_PATH));
    }

    let bucket = config.bucket_name();
    if is_blank(bucket) {
        return Err(PluginError::configuration(MISSING_BUCKET));
    }
    let bucket = bucket.unwrap_or_default().to_string();

    // Empty content is a valid upload; only an absent body is rejected
    if action == S3Action::UploadFileFromBody && config.body.is_none() {
        return Err(PluginError::configuration(MISSING_BODY));
    }

    let path = path.unwrap_or_default().to_string();
    Ok(match action {
        S3Action::List => Operation::List { bucket },
        S3Action::UploadFileFromBody => Operation::Upload {
            bucket,
            path,
            body: config.body.clone().unwrap_or_default(),
        },
        S3Action::ReadFile => Operation::Read { bucket, path },
        S3Action::DeleteFile => Operation::Delete { bucket, path },
    })
}
