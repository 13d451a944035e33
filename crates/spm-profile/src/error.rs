//! Error types for the profile crate.

use std::path::PathBuf;

use spm_types::ApiVersion;

/// Errors that can occur while scanning, editing, or saving a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The document is not well-formed XML or has no root element.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading or writing a profile file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No record with this identity key exists in the profile.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// The attribute is not declared for the record's category.
    #[error("unknown attribute {attribute:?} for category {category}")]
    UnknownAttribute { category: String, attribute: String },

    /// The attribute exists but is not part of the category's toggle view.
    #[error("attribute {attribute:?} of category {category} is not toggleable")]
    NotToggleable { category: String, attribute: String },

    /// A record built under one API version was added to a profile of another.
    #[error("record {identity} is version {found}, profile is version {expected}")]
    VersionMismatch {
        identity: String,
        expected: ApiVersion,
        found: ApiVersion,
    },

    /// The profile has no file path to read from or write to.
    #[error("profile {0:?} has no file path")]
    NoPath(String),

    /// Producing XML text failed.
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl ProfileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProfileError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for profile results.
pub type ProfileResult<T> = Result<T, ProfileError>;
