//! Metadata API versions and the version windows the schema is keyed on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// API version used when nothing else is specified.
pub const DEFAULT_API_VERSION: ApiVersion = ApiVersion(54);

/// A Salesforce Metadata API version.
///
/// Only the major number matters for profile shape, so `"54.0"` and `"54"`
/// parse to the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(pub u32);

impl ApiVersion {
    /// Create a version from its major number.
    pub const fn new(major: u32) -> Self {
        Self(major)
    }

    /// The major version number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        DEFAULT_API_VERSION
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.0", self.0)
    }
}

impl FromStr for ApiVersion {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let major = match trimmed.split_once('.') {
            Some((major, minor)) if minor.chars().all(|c| c == '0') => major,
            Some(_) => return Err(TypeError::InvalidApiVersion(s.to_string())),
            None => trimmed,
        };
        major
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .map(Self)
            .ok_or_else(|| TypeError::InvalidApiVersion(s.to_string()))
    }
}

/// An inclusive window of API versions.
///
/// `None` on either side leaves that side open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl VersionRange {
    /// Valid in every version.
    pub const ALL: Self = Self { min: None, max: None };

    /// Valid from `min` onward.
    pub const fn since(min: u32) -> Self {
        Self { min: Some(min), max: None }
    }

    /// Valid up to and including `max`.
    pub const fn until(max: u32) -> Self {
        Self { min: None, max: Some(max) }
    }

    /// Valid from `min` through `max`, both inclusive.
    pub const fn between(min: u32, max: u32) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    /// Whether `version` falls inside the window.
    pub fn contains(&self, version: ApiVersion) -> bool {
        let v = version.get();
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "all"),
            (Some(min), None) => write!(f, ">={min}"),
            (None, Some(max)) => write!(f, "<={max}"),
            (Some(min), Some(max)) => write!(f, "{min}-{max}"),
        }
    }
}
