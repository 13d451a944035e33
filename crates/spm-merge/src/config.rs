use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spm_types::ApiVersion;

use crate::direction::MergeDirection;
use crate::error::{MergeError, MergeResult};

/// Settings for a merge run.
///
/// Every field is optional in the TOML file; missing fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Metadata API version both inputs are read and the output written under.
    pub api_version: u32,
    /// When `true`, A is merged into B and A's records win.
    pub merge_a_into_b: bool,
    /// Where the merged profile is written.
    pub output_path: PathBuf,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::default().get(),
            merge_a_into_b: false,
            output_path: PathBuf::from("merged_profile.profile"),
        }
    }
}

impl MergeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> MergeResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| MergeError::Config(e.to_string()))?;
        config.version()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MergeError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The configured API version.
    pub fn version(&self) -> MergeResult<ApiVersion> {
        if self.api_version == 0 {
            return Err(MergeError::Config("api_version must be positive".into()));
        }
        Ok(ApiVersion::new(self.api_version))
    }

    pub fn direction(&self) -> MergeDirection {
        MergeDirection::from_a_into_b(self.merge_a_into_b)
    }

    pub fn to_toml_string(&self) -> MergeResult<String> {
        toml::to_string_pretty(self).map_err(|e| MergeError::Config(e.to_string()))
    }
}
