//! Diff engine for the Salesforce Profile Merger.
//!
//! Compares field records attribute by attribute and whole profiles identity
//! by identity. Comparison is loose: text is coerced against booleans, and
//! null equals the empty string since neither is serialized.
//!
//! # Key Types
//!
//! - [`ValueDiff`] -- one identity whose attribute values differ between two records
//! - [`ProfileDiff`] / [`ProfileChange`] -- identity-level comparison of two profiles

pub mod profile_diff;
pub mod value_diff;

pub use profile_diff::{diff_profiles, ProfileChange, ProfileDiff};
pub use value_diff::{diff_records, ValueDiff};
