//! Record-level diff: compare two records that share an identity.

use std::fmt;

use serde::Serialize;
use spm_profile::FieldRecord;
use spm_types::AttrMap;

/// A difference between two records with the same identity key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueDiff {
    /// Identity key shared by both records.
    pub identity: String,
    /// Category tag name.
    pub category: String,
    /// Attribute snapshot of the lower-precedence record.
    pub base: AttrMap,
    /// Attribute snapshot of the higher-precedence record.
    pub overlay: AttrMap,
    /// Names of the attributes whose values differ.
    pub changed: Vec<String>,
}

impl ValueDiff {
    /// `(base, overlay)` values of every changed attribute.
    pub fn changed_values(&self) -> impl Iterator<Item = (&str, String, String)> + '_ {
        self.changed.iter().map(|name| {
            let show = |m: &AttrMap| m.get(name).map(ToString::to_string).unwrap_or_else(|| "null".into());
            (name.as_str(), show(&self.base), show(&self.overlay))
        })
    }
}

impl fmt::Display for ValueDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.identity)?;
        for (name, base, overlay) in self.changed_values() {
            write!(f, " {name}={base}->{overlay}")?;
        }
        Ok(())
    }
}

/// Compare the attributes of two records.
///
/// Only the attributes legal at each record's version take part. Returns
/// `None` when every attribute agrees under loose comparison.
pub fn diff_records(base: &FieldRecord, overlay: &FieldRecord) -> Option<ValueDiff> {
    let base_attrs = base.attributes();
    let overlay_attrs = overlay.attributes();
    let changed = base_attrs.differing_keys(&overlay_attrs);
    if changed.is_empty() {
        return None;
    }
    Some(ValueDiff {
        identity: overlay.identity().to_string(),
        category: overlay.category_name().to_string(),
        base: base_attrs,
        overlay: overlay_attrs,
        changed,
    })
}
