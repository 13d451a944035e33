//! Schema registry for Salesforce Profile metadata.
//!
//! Maps each profile tag name to a [`CategoryDef`]: the attribute shape of the
//! category, which attributes are toggleable, how the identity key is derived,
//! and the API version window in which the category and each of its
//! attributes exist. The table is static data; nothing here has side effects.
//!
//! # Key Types
//!
//! - [`SchemaRegistry`] -- tag name → category lookup, built once per process
//! - [`CategoryDef`] / [`AttrDef`] -- declarative category and attribute shapes
//! - [`IdentityRule`] -- discriminator attributes and conditional suffixing

pub mod category;
pub mod registry;
pub mod table;

pub use category::{AttrDef, AttrDefault, AttrKind, CategoryDef, CategoryKind, IdentityRule, SuffixWhen};
pub use registry::{lookup_category, SchemaRegistry};
pub use table::{CATEGORIES, METADATA_NAMESPACE};
