//! Error types for the merge crate.

use spm_profile::ProfileError;
use spm_types::ApiVersion;

use crate::direction::Side;

/// Errors that can occur while merging profiles.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Base and overlay were read under different API versions.
    #[error("version mismatch: base is {base}, overlay is {overlay}")]
    VersionMismatch { base: ApiVersion, overlay: ApiVersion },

    /// A session operation needs a profile that has not been loaded.
    #[error("profile {0} is not loaded")]
    MissingInput(Side),

    /// Scanning, editing, or saving a profile failed.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// The merge configuration could not be read or is invalid.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
