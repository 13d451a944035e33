//! Attribute values and the ordered attribute map.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Coerce text to a boolean.
///
/// Exactly the strings equal to `"true"` ignoring ASCII case are `true`;
/// everything else, including the empty string, is `false`. Never fails.
pub fn coerce_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// A single attribute value of a field record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Text(String),
}

impl AttrValue {
    /// Shorthand for a text value.
    pub fn text(s: impl Into<String>) -> Self {
        AttrValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// `true` for null and the empty string: values the serializer omits.
    pub fn is_blank(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::Text(s) => s.is_empty(),
            AttrValue::Bool(_) => false,
        }
    }

    /// The boolean reading of this value, coercing text.
    pub fn as_bool(&self) -> bool {
        match self {
            AttrValue::Bool(b) => *b,
            AttrValue::Text(s) => coerce_bool(s),
            AttrValue::Null => false,
        }
    }

    /// The XML text this value renders to, or `None` when it is omitted.
    ///
    /// Booleans render as lowercase `true`/`false`.
    pub fn render(&self) -> Option<String> {
        match self {
            AttrValue::Null => None,
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Text(s) if s.is_empty() => None,
            AttrValue::Text(s) => Some(s.clone()),
        }
    }

    /// Compare two values the way the merge engine does.
    ///
    /// If either side is a boolean the other is coerced before comparing.
    /// Null and the empty string are equal, since both serialize to nothing.
    pub fn loosely_eq(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Bool(a), b) | (b, AttrValue::Bool(a)) if !b.is_blank() || b.is_bool() => {
                *a == b.as_bool()
            }
            (a, b) if a.is_blank() && b.is_blank() => true,
            (a, b) => a == b,
        }
    }

    fn is_bool(&self) -> bool {
        matches!(self, AttrValue::Bool(_))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttrValue::Null, Into::into)
    }
}

/// An insertion-ordered attribute name → value mapping.
///
/// Attribute order follows the schema declaration, so lookups are linear;
/// no category declares more than a handful of attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute names whose values differ under [`AttrValue::loosely_eq`].
    ///
    /// A name present on only one side counts as different unless the value
    /// there is blank.
    pub fn differing_keys(&self, other: &AttrMap) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (name, value) in self.iter() {
            let theirs = other.get(name).unwrap_or(&AttrValue::Null);
            if !value.loosely_eq(theirs) {
                names.push(name.to_string());
            }
        }
        for (name, value) in other.iter() {
            if !self.contains_key(name) && !value.is_blank() {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        let mut map = AttrMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for AttrMap {
    type Item = (String, AttrValue);
    type IntoIter = std::vec::IntoIter<(String, AttrValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
