//! Merge engine for the Salesforce Profile Merger.
//!
//! Combines a base and an overlay profile into one merged profile. Records
//! are merged as whole units: on an identity collision the overlay record
//! replaces the base record, and a value difference is reported when their
//! attributes disagree.
//!
//! # Key Types
//!
//! - [`merge`] / [`merge_into`] -- the directionless base/overlay merge
//! - [`MergeDirection`] / [`Side`] -- which of profiles A and B wins
//! - [`ProfileMerger`] / [`MergeReport`] -- an A/B merge session with manual edits
//! - [`MergeConfig`] -- run settings loaded from TOML

pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod session;

pub use config::MergeConfig;
pub use direction::{MergeDirection, Side};
pub use engine::{merge, merge_into};
pub use error::{MergeError, MergeResult};
pub use session::{MergeReport, ProfileMerger};
