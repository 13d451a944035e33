//! Profile documents for the Salesforce Profile Merger.
//!
//! Reads a profile XML document into identity-keyed field records, lets
//! callers edit and toggle those records, and writes them back out in a
//! canonical, deterministic form.
//!
//! # Key Types
//!
//! - [`Profile`] -- a named set of records keyed by identity, with scan and save
//! - [`FieldRecord`] -- one category instance with its attribute values and toggles
//! - [`scan_document`] / [`render_profile`] -- document → records and back

pub mod error;
pub mod profile;
pub mod record;
pub mod scanner;
pub mod serializer;
pub mod xml;

pub use error::{ProfileError, ProfileResult};
pub use profile::{Profile, ProfileState};
pub use record::FieldRecord;
pub use scanner::{scan_document, ScanOutcome, PROFILE_ROOT};
pub use serializer::render_profile;
pub use xml::{parse_document, XmlElement};
