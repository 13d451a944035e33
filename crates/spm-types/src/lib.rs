//! Foundation types for the Salesforce Profile Merger (SPM).
//!
//! This crate provides the value and versioning primitives shared by every
//! other SPM crate.
//!
//! # Key Types
//!
//! - [`ApiVersion`] -- Metadata API version a document is read and written under
//! - [`VersionRange`] -- Inclusive version window in which a category or attribute exists
//! - [`AttrValue`] -- A single attribute value: text, boolean, or null
//! - [`AttrMap`] -- Ordered attribute name → value mapping
//! - [`coerce_bool`] -- Total string-to-boolean coercion

pub mod error;
pub mod value;
pub mod version;

pub use error::TypeError;
pub use value::{coerce_bool, AttrMap, AttrValue};
pub use version::{ApiVersion, VersionRange, DEFAULT_API_VERSION};
