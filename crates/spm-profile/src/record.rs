//! Field records: the versioned, identity-keyed unit of profile data.

use std::fmt;

use spm_schema::CategoryDef;
use spm_types::{ApiVersion, AttrMap, AttrValue};
use tracing::debug;

use crate::error::{ProfileError, ProfileResult};

/// One instance of a profile category.
///
/// Values are stored for every attribute the category declares; which of them
/// are visible depends on the record's API version. The identity key is kept
/// in step with the discriminator attributes on every write.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRecord {
    category: &'static CategoryDef,
    version: ApiVersion,
    identity: String,
    values: AttrMap,
    disabled: bool,
}

impl FieldRecord {
    /// Create a record with the category's constructor defaults.
    pub fn new(category: &'static CategoryDef, version: ApiVersion) -> Self {
        let values = category
            .attributes
            .iter()
            .map(|a| (a.name, a.default.value()))
            .collect();
        Self::with_values(category, version, values)
    }

    /// Create a record with every attribute null.
    ///
    /// Parsed records start here, so a child missing from the document stays
    /// null instead of picking up a default.
    pub fn blank(category: &'static CategoryDef, version: ApiVersion) -> Self {
        let values = category
            .attributes
            .iter()
            .map(|a| (a.name, AttrValue::Null))
            .collect();
        Self::with_values(category, version, values)
    }

    /// Create a scalar record holding `value`.
    pub fn scalar(category: &'static CategoryDef, version: ApiVersion, value: impl Into<AttrValue>) -> Self {
        let mut record = Self::blank(category, version);
        if let Some(attr) = category.attributes.first() {
            record.values.insert(attr.name, value.into());
        }
        record
    }

    /// Build a record from parsed element text.
    ///
    /// For a scalar category `pairs` should hold the element's own text under
    /// the category name.
    pub fn from_parsed<'a>(
        category: &'static CategoryDef,
        version: ApiVersion,
        pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    ) -> Self {
        let mut record = Self::blank(category, version);
        record.set_attributes(pairs);
        record
    }

    fn with_values(category: &'static CategoryDef, version: ApiVersion, values: AttrMap) -> Self {
        let mut record = Self {
            category,
            version,
            identity: String::new(),
            values,
            disabled: false,
        };
        record.recompute_identity();
        record
    }

    /// Assign attribute values from parsed text.
    ///
    /// Boolean attributes are coerced; `None` text becomes null. Names the
    /// category does not declare are ignored.
    pub fn set_attributes<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) {
        let mut touched_identity = false;
        for (name, raw) in pairs {
            let Some(def) = self.category.attribute(name) else {
                debug!(category = self.category.name, attribute = name, "ignoring undeclared attribute");
                continue;
            };
            let value = raw.map_or(AttrValue::Null, |text| def.kind.parse(text));
            self.values.insert(def.name, value);
            touched_identity |= self.category.is_discriminator(def.name);
        }
        if touched_identity {
            self.recompute_identity();
        }
    }

    /// Assign a typed value verbatim, without coercion.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> ProfileResult<()> {
        let def = self
            .category
            .attribute(name)
            .ok_or_else(|| ProfileError::UnknownAttribute {
                category: self.category.name.to_string(),
                attribute: name.to_string(),
            })?;
        self.values.insert(def.name, value.into());
        if self.category.is_discriminator(def.name) {
            self.recompute_identity();
        }
        Ok(())
    }

    /// Write through the toggle view.
    pub fn set_toggle(&mut self, name: &str, on: bool) -> ProfileResult<()> {
        if !self.toggle_names().any(|t| t == name) {
            return Err(ProfileError::NotToggleable {
                category: self.category.name.to_string(),
                attribute: name.to_string(),
            });
        }
        self.set(name, on)
    }

    /// Current value of a declared attribute, regardless of version.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    /// The attributes legal at this record's version, in declaration order.
    pub fn attributes(&self) -> AttrMap {
        self.category
            .attributes_at(self.version)
            .map(|a| (a.name, self.values.get(a.name).cloned().unwrap_or_default()))
            .collect()
    }

    /// The toggleable subset of [`attributes`](Self::attributes).
    pub fn toggles(&self) -> AttrMap {
        self.category
            .toggles_at(self.version)
            .map(|a| (a.name, self.values.get(a.name).cloned().unwrap_or_default()))
            .collect()
    }

    fn toggle_names(&self) -> impl Iterator<Item = &'static str> {
        self.category.toggles_at(self.version).map(|a| a.name)
    }

    /// The value of a scalar record.
    pub fn value(&self) -> Option<&AttrValue> {
        if !self.category.is_scalar() {
            return None;
        }
        self.category.attributes.first().and_then(|a| self.values.get(a.name))
    }

    pub fn category(&self) -> &'static CategoryDef {
        self.category
    }

    pub fn category_name(&self) -> &'static str {
        self.category.name
    }

    pub fn is_scalar(&self) -> bool {
        self.category.is_scalar()
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    fn recompute_identity(&mut self) {
        let values = &self.values;
        self.identity = self.category.identity_key(|name| values.get(name));
    }
}

impl fmt::Display for FieldRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.identity)
    }
}
