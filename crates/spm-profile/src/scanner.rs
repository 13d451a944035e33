//! Document → field record mapping.

use std::collections::BTreeMap;

use spm_schema::SchemaRegistry;
use spm_types::ApiVersion;
use tracing::{debug, warn};

use crate::error::ProfileResult;
use crate::record::FieldRecord;
use crate::xml::{parse_document, XmlElement};

/// Root element name of a profile document.
pub const PROFILE_ROOT: &str = "Profile";

/// Result of scanning one document.
#[derive(Clone, Debug, Default)]
pub struct ScanOutcome {
    /// Namespace of the first top-level element.
    pub namespace: Option<String>,
    /// Records keyed by identity.
    pub records: BTreeMap<String, FieldRecord>,
    /// Top-level tags that were skipped, either unknown to the registry or
    /// outside their version window.
    pub skipped: Vec<String>,
    /// How many elements replaced an earlier one with the same identity.
    pub collisions: usize,
}

/// Scan a profile document into identity-keyed records.
///
/// Unknown categories and categories that do not exist at `version` are
/// skipped. A later element with an identity already seen replaces the
/// earlier record. Only malformed XML is an error.
pub fn scan_document(
    document: &str,
    version: ApiVersion,
    registry: &SchemaRegistry,
) -> ProfileResult<ScanOutcome> {
    let root = parse_document(document)?;
    if root.name != PROFILE_ROOT {
        warn!(root = %root.name, "document root is not <Profile>; scanning anyway");
    }

    let mut outcome = ScanOutcome::default();
    for element in &root.children {
        if outcome.namespace.is_none() {
            outcome.namespace = element.namespace.clone();
        }

        let Some(category) = registry.lookup(&element.name) else {
            debug!(tag = %element.name, "skipping unknown category");
            outcome.skipped.push(element.name.clone());
            continue;
        };
        if !category.is_active(version) {
            debug!(tag = %element.name, %version, range = %category.versions, "skipping category outside version window");
            outcome.skipped.push(element.name.clone());
            continue;
        }

        let record = if category.is_scalar() {
            FieldRecord::from_parsed(category, version, [(category.name, element.text())])
        } else {
            FieldRecord::from_parsed(category, version, child_pairs(element))
        };

        let identity = record.identity().to_string();
        if outcome.records.insert(identity.clone(), record).is_some() {
            debug!(%identity, "identity collision; later element wins");
            outcome.collisions += 1;
        }
    }

    if outcome.namespace.is_none() {
        outcome.namespace = root.namespace.clone();
    }
    Ok(outcome)
}

fn child_pairs(element: &XmlElement) -> impl Iterator<Item = (&str, Option<&str>)> {
    element.children.iter().map(|c| (c.name.as_str(), c.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::AttrValue;

    const V54: ApiVersion = ApiVersion(54);

    fn scan(doc: &str) -> ScanOutcome {
        scan_document(doc, V54, SchemaRegistry::global()).unwrap()
    }

    fn profile(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Profile xmlns="http://soap.sforce.com/2006/04/metadata">{body}</Profile>"#
        )
    }

    #[test]
    fn scans_composite_and_scalar() {
        let out = scan(&profile(
            "<classAccesses><apexClass>Foo</apexClass><enabled>true</enabled></classAccesses>\
             <fullName>Admin</fullName><custom>false</custom>",
        ));
        assert_eq!(out.records.len(), 3);
        assert_eq!(
            out.namespace.as_deref(),
            Some("http://soap.sforce.com/2006/04/metadata")
        );
        let access = &out.records["classAccesses:Foo"];
        assert_eq!(access.get("enabled"), Some(&AttrValue::Bool(true)));
        assert_eq!(out.records["fullName"].value(), Some(&AttrValue::text("Admin")));
        assert_eq!(out.records["custom"].value(), Some(&AttrValue::Bool(false)));
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let out = scan(&profile(
            "<futureThing><x>1</x></futureThing><fullName>Admin</fullName>",
        ));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.skipped, vec!["futureThing".to_string()]);
    }

    #[test]
    fn out_of_version_categories_are_skipped() {
        let doc = profile(
            "<applicationVisibilities><application>App</application><visible>true</visible></applicationVisibilities>",
        );
        let at_54 = scan(&doc);
        assert!(at_54.records.is_empty());
        assert_eq!(at_54.skipped, vec!["applicationVisibilities".to_string()]);

        let at_44 = scan_document(&doc, ApiVersion(44), SchemaRegistry::global()).unwrap();
        assert!(at_44.records.contains_key("applicationVisibilities:App"));
    }

    #[test]
    fn duplicate_identity_last_wins() {
        let out = scan(&profile(
            "<classAccesses><apexClass>Foo</apexClass><enabled>true</enabled></classAccesses>\
             <classAccesses><apexClass>Foo</apexClass><enabled>false</enabled></classAccesses>",
        ));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.collisions, 1);
        assert_eq!(out.records["classAccesses:Foo"].get("enabled"), Some(&AttrValue::Bool(false)));
    }

    #[test]
    fn distinct_discriminators_do_not_collide() {
        let out = scan(&profile(
            "<layoutAssignments><layout>Account-Layout</layout></layoutAssignments>\
             <layoutAssignments><layout>Account-Layout</layout><recordType>Account.Partner</recordType></layoutAssignments>",
        ));
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.collisions, 0);
    }

    #[test]
    fn missing_children_are_null() {
        let out = scan(&profile("<fieldPermissions><field>Account.Name</field></fieldPermissions>"));
        let rec = &out.records["fieldPermissions:Account.Name"];
        assert_eq!(rec.get("editable"), Some(&AttrValue::Null));
    }

    #[test]
    fn malformed_document_fails_whole_scan() {
        let result = scan_document(
            "<Profile><fullName>Admin</Profile>",
            V54,
            SchemaRegistry::global(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_profile_scans_to_nothing() {
        let out = scan(&profile(""));
        assert!(out.records.is_empty());
        assert_eq!(
            out.namespace.as_deref(),
            Some("http://soap.sforce.com/2006/04/metadata")
        );
    }
}
