//! Declarative category and attribute definitions.

use serde::Serialize;
use spm_types::{coerce_bool, ApiVersion, AttrValue, VersionRange};

/// How raw element text is turned into an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AttrKind {
    /// Kept verbatim.
    Text,
    /// Coerced with [`coerce_bool`].
    Bool,
    /// Kept verbatim when equal to the literal, otherwise coerced to a boolean.
    BoolOr(&'static str),
}

impl AttrKind {
    /// Convert parsed element text into a typed value.
    pub fn parse(&self, raw: &str) -> AttrValue {
        match self {
            AttrKind::Text => AttrValue::text(raw),
            AttrKind::Bool => AttrValue::Bool(coerce_bool(raw)),
            AttrKind::BoolOr(literal) if raw == *literal => AttrValue::text(raw),
            AttrKind::BoolOr(_) => AttrValue::Bool(coerce_bool(raw)),
        }
    }

    pub fn is_boolean(&self) -> bool {
        !matches!(self, AttrKind::Text)
    }
}

/// Constructor default of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AttrDefault {
    Null,
    Text(&'static str),
    Bool(bool),
}

impl AttrDefault {
    pub fn value(&self) -> AttrValue {
        match self {
            AttrDefault::Null => AttrValue::Null,
            AttrDefault::Text(s) => AttrValue::text(*s),
            AttrDefault::Bool(b) => AttrValue::Bool(*b),
        }
    }
}

/// One attribute (child element) of a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AttrDef {
    pub name: &'static str,
    pub kind: AttrKind,
    pub default: AttrDefault,
    /// Part of the category's toggle view.
    pub toggle: bool,
    pub versions: VersionRange,
}

impl AttrDef {
    /// A text attribute defaulting to the empty string.
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: AttrKind::Text,
            default: AttrDefault::Text(""),
            toggle: false,
            versions: VersionRange::ALL,
        }
    }

    /// A toggleable boolean attribute.
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: AttrKind::Bool,
            default: AttrDefault::Bool(default),
            toggle: true,
            versions: VersionRange::ALL,
        }
    }

    /// A boolean attribute that is not part of the toggle view.
    pub const fn boolean(name: &'static str, default: bool) -> Self {
        Self {
            toggle: false,
            ..Self::flag(name, default)
        }
    }

    pub const fn with_default(self, default: AttrDefault) -> Self {
        Self { default, ..self }
    }

    pub const fn with_kind(self, kind: AttrKind) -> Self {
        Self { kind, ..self }
    }

    pub const fn since(self, min: u32) -> Self {
        Self {
            versions: VersionRange::since(min),
            ..self
        }
    }

    pub const fn until(self, max: u32) -> Self {
        Self {
            versions: VersionRange::until(max),
            ..self
        }
    }

    pub fn is_active(&self, version: ApiVersion) -> bool {
        self.versions.contains(version)
    }
}

/// Whether instances are keyed by discriminators or unique per document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CategoryKind {
    /// Zero or more instances, each with child attribute elements.
    Composite,
    /// At most one instance whose value is the element's own text.
    Scalar,
}

/// When a conditional identity suffix is appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SuffixWhen {
    /// The suffix attribute reads as boolean `true`.
    True,
    /// The suffix attribute is non-null and non-empty.
    NonEmpty,
}

/// How a record's identity key is derived from its attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IdentityRule {
    /// The category name alone.
    Category,
    /// Category followed by each discriminator value.
    Parts(&'static [&'static str]),
    /// Like `Parts`, then `suffix` appended only when `when` holds.
    PartsWithSuffix {
        parts: &'static [&'static str],
        suffix: &'static str,
        when: SuffixWhen,
    },
}

impl IdentityRule {
    /// Every attribute that can influence the identity key.
    pub fn discriminators(&self) -> Vec<&'static str> {
        match self {
            IdentityRule::Category => Vec::new(),
            IdentityRule::Parts(parts) => parts.to_vec(),
            IdentityRule::PartsWithSuffix { parts, suffix, .. } => {
                let mut all = parts.to_vec();
                all.push(suffix);
                all
            }
        }
    }
}

/// A profile metadata category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryDef {
    /// The XML tag name.
    pub name: &'static str,
    pub kind: CategoryKind,
    /// Attributes in serialization order. A scalar category has exactly one,
    /// named after the category.
    pub attributes: &'static [AttrDef],
    pub identity: IdentityRule,
    pub versions: VersionRange,
}

impl CategoryDef {
    pub fn is_scalar(&self) -> bool {
        self.kind == CategoryKind::Scalar
    }

    pub fn is_active(&self, version: ApiVersion) -> bool {
        self.versions.contains(version)
    }

    /// Look up an attribute by name regardless of version.
    pub fn attribute(&self, name: &str) -> Option<&'static AttrDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes that exist at `version`, in declaration order.
    pub fn attributes_at(&self, version: ApiVersion) -> impl Iterator<Item = &'static AttrDef> {
        self.attributes.iter().filter(move |a| a.is_active(version))
    }

    /// Toggleable attributes that exist at `version`.
    pub fn toggles_at(&self, version: ApiVersion) -> impl Iterator<Item = &'static AttrDef> {
        self.attributes_at(version).filter(|a| a.toggle)
    }

    /// Whether changing `name` can change the identity key.
    pub fn is_discriminator(&self, name: &str) -> bool {
        self.identity.discriminators().contains(&name)
    }

    /// Derive the identity key, reading attribute values through `get`.
    ///
    /// Parts follow the category name, each after a `:`. A conditional
    /// suffix follows a `#`. Within a value, backslash, `:` and `#` are escaped
    /// with a backslash, so distinct discriminator tuples never share a key.
    /// Missing or null discriminators contribute an empty part.
    pub fn identity_key<'a>(&self, get: impl Fn(&str) -> Option<&'a AttrValue>) -> String {
        let push_part = |key: &mut String, name: &str| {
            if let Some(value) = get(name).filter(|v| !v.is_null()) {
                escape_into(key, &value.to_string());
            }
        };
        let mut key = self.name.to_string();
        let (parts, suffix) = match self.identity {
            IdentityRule::Category => return key,
            IdentityRule::Parts(parts) => (parts, None),
            IdentityRule::PartsWithSuffix { parts, suffix, when } => (parts, Some((suffix, when))),
        };
        for p in parts {
            key.push(PART_SEPARATOR);
            push_part(&mut key, p);
        }
        if let Some((suffix, when)) = suffix {
            let value = get(suffix);
            let append = match when {
                SuffixWhen::True => value.is_some_and(AttrValue::as_bool),
                SuffixWhen::NonEmpty => value.is_some_and(|v| !v.is_blank()),
            };
            if append {
                key.push(SUFFIX_SEPARATOR);
                push_part(&mut key, suffix);
            }
        }
        key
    }
}

const PART_SEPARATOR: char = ':';
const SUFFIX_SEPARATOR: char = '#';

fn escape_into(key: &mut String, value: &str) {
    for c in value.chars() {
        if matches!(c, '\\' | PART_SEPARATOR | SUFFIX_SEPARATOR) {
            key.push('\\');
        }
        key.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::AttrMap;

    const LAYOUT_ATTRS: &[AttrDef] = &[AttrDef::text("layout"), AttrDef::text("recordType")];
    const LAYOUT: CategoryDef = CategoryDef {
        name: "layoutAssignments",
        kind: CategoryKind::Composite,
        attributes: LAYOUT_ATTRS,
        identity: IdentityRule::PartsWithSuffix {
            parts: &["layout"],
            suffix: "recordType",
            when: SuffixWhen::NonEmpty,
        },
        versions: VersionRange::ALL,
    };

    fn key(def: &CategoryDef, attrs: &AttrMap) -> String {
        def.identity_key(|n| attrs.get(n))
    }

    #[test]
    fn suffix_only_when_non_empty() {
        let mut attrs: AttrMap = [("layout", AttrValue::text("Account-Layout"))].into_iter().collect();
        assert_eq!(key(&LAYOUT, &attrs), "layoutAssignments:Account-Layout");
        attrs.insert("recordType", AttrValue::text(""));
        assert_eq!(key(&LAYOUT, &attrs), "layoutAssignments:Account-Layout");
        attrs.insert("recordType", AttrValue::text("Account.Partner"));
        assert_eq!(key(&LAYOUT, &attrs), "layoutAssignments:Account-Layout#Account.Partner");
    }

    #[test]
    fn separators_inside_values_are_escaped() {
        let joined: AttrMap = [("layout", AttrValue::text("A:B"))].into_iter().collect();
        let split: AttrMap = [("layout", AttrValue::text("A")), ("recordType", AttrValue::text("B"))]
            .into_iter()
            .collect();
        assert_eq!(key(&LAYOUT, &joined), r"layoutAssignments:A\:B");
        assert_eq!(key(&LAYOUT, &split), "layoutAssignments:A#B");

        let hashed: AttrMap = [("layout", AttrValue::text(r"A#B\"))].into_iter().collect();
        assert_eq!(key(&LAYOUT, &hashed), r"layoutAssignments:A\#B\\");
    }

    #[test]
    fn null_discriminator_is_empty_part() {
        let attrs = AttrMap::new();
        assert_eq!(key(&LAYOUT, &attrs), "layoutAssignments:");
    }

    #[test]
    fn bool_or_literal_parsing() {
        let kind = AttrKind::BoolOr("ALL");
        assert_eq!(kind.parse("ALL"), AttrValue::text("ALL"));
        assert_eq!(kind.parse("true"), AttrValue::Bool(true));
        assert_eq!(kind.parse("NONE"), AttrValue::Bool(false));
    }

    #[test]
    fn const_builders_compose() {
        let a = AttrDef::boolean("hidden", false).until(22);
        assert!(!a.toggle);
        assert!(a.is_active(ApiVersion(22)));
        assert!(!a.is_active(ApiVersion(23)));
        assert_eq!(a.default.value(), AttrValue::Bool(false));
    }

    #[test]
    fn discriminators_include_suffix() {
        assert_eq!(LAYOUT.identity.discriminators(), vec!["layout", "recordType"]);
        assert!(LAYOUT.is_discriminator("recordType"));
        assert!(!LAYOUT.is_discriminator("other"));
    }
}
