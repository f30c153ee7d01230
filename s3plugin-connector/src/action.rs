//! Actions the connector can execute

use std::str::FromStr;

/// Action identifiers accepted in the query form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Action {
    List,
    UploadFileFromBody,
    ReadFile,
    DeleteFile,
}

impl S3Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::UploadFileFromBody => "UPLOAD_FILE_FROM_BODY",
            Self::ReadFile => "READ_FILE",
            Self::DeleteFile => "DELETE_FILE",
        }
    }

    /// Whether the action operates on a single object path
    pub fn requires_path(&self) -> bool {
        !matches!(self, Self::List)
    }
}

impl FromStr for S3Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIST" => Ok(Self::List),
            "UPLOAD_FILE_FROM_BODY" => Ok(Self::UploadFileFromBody),
            "READ_FILE" => Ok(Self::ReadFile),
            "DELETE_FILE" => Ok(Self::DeleteFile),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for S3Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated action with every parameter it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List { bucket: String },
    Upload { bucket: String, path: String, body: String },
    Read { bucket: String, path: String },
    Delete { bucket: String, path: String },
}

impl Operation {
    pub fn action(&self) -> S3Action {
        match self {
            Self::List { .. } => S3Action::List,
            Self::Upload { .. } => S3Action::UploadFileFromBody,
            Self::Read { .. } => S3Action::ReadFile,
            Self::Delete { .. } => S3Action::DeleteFile,
        }
    }

    pub fn bucket(&self) -> &str {
        match self {
            Self::List { bucket }
            | Self::Upload { bucket, .. }
            | Self::Read { bucket, .. }
            | Self::Delete { bucket, .. } => bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        for action in [
            S3Action::List,
            S3Action::UploadFileFromBody,
            S3Action::ReadFile,
            S3Action::DeleteFile,
        ] {
            assert_eq!(action.as_str().parse::<S3Action>(), Ok(action));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_lowercase() {
        assert!("COPY_FILE".parse::<S3Action>().is_err());
        assert!("list".parse::<S3Action>().is_err());
    }

    #[test]
    fn test_requires_path() {
        assert!(!S3Action::List.requires_path());
        assert!(S3Action::ReadFile.requires_path());
        assert!(S3Action::UploadFileFromBody.requires_path());
        assert!(S3Action::DeleteFile.requires_path());
    }
}
