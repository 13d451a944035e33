//! Profile-level diff: compare two profiles identity by identity.

use serde::Serialize;
use spm_profile::Profile;
use tracing::debug;

use crate::value_diff::{diff_records, ValueDiff};

/// The result of comparing two profiles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileDiff {
    /// Changes in ascending identity order.
    pub changes: Vec<ProfileChange>,
}

impl ProfileDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the profiles hold the same records.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of identities only the first profile has.
    pub fn only_in_a(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ProfileChange::OnlyInA { .. }))
            .count()
    }

    /// Number of identities only the second profile has.
    pub fn only_in_b(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ProfileChange::OnlyInB { .. }))
            .count()
    }

    /// Number of shared identities whose values differ.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ProfileChange::Modified(_)))
            .count()
    }
}

/// A single difference between two profiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileChange {
    /// The identity exists only in the first profile.
    OnlyInA { identity: String },
    /// The identity exists only in the second profile.
    OnlyInB { identity: String },
    /// Both profiles hold the identity with differing values.
    Modified(ValueDiff),
}

impl ProfileChange {
    pub fn identity(&self) -> &str {
        match self {
            ProfileChange::OnlyInA { identity } | ProfileChange::OnlyInB { identity } => identity,
            ProfileChange::Modified(diff) => &diff.identity,
        }
    }
}

/// Compare two profiles.
///
/// Identities held by one side only become `OnlyInA`/`OnlyInB`; shared
/// identities are compared with [`diff_records`], `a` taking the base role.
pub fn diff_profiles(a: &Profile, b: &Profile) -> ProfileDiff {
    let mut changes = Vec::new();

    for (identity, record) in a.iter() {
        match b.get(identity) {
            Ok(other) => {
                if let Some(diff) = diff_records(record, other) {
                    changes.push(ProfileChange::Modified(diff));
                }
            }
            Err(_) => changes.push(ProfileChange::OnlyInA {
                identity: identity.to_string(),
            }),
        }
    }

    for identity in b.identities() {
        if !a.contains(identity) {
            changes.push(ProfileChange::OnlyInB {
                identity: identity.to_string(),
            });
        }
    }

    changes.sort_by(|x, y| x.identity().cmp(y.identity()));
    debug!(a = a.name(), b = b.name(), changes = changes.len(), "compared profiles");
    ProfileDiff { changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, body: &str) -> Profile {
        let mut p = Profile::new(name);
        p.scan_str(&format!(
            r#"<Profile xmlns="http://soap.sforce.com/2006/04/metadata">{body}</Profile>"#
        ))
        .unwrap();
        p
    }

    #[test]
    fn identical_profiles_no_diff() {
        let a = profile("A", "<fullName>Admin</fullName>");
        assert!(diff_profiles(&a, &a.clone()).is_empty());
    }

    #[test]
    fn empty_against_populated() {
        let a = Profile::new("A");
        let b = profile("B", "<fullName>Admin</fullName><custom>true</custom>");
        let diff = diff_profiles(&a, &b);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.only_in_b(), 2);
        assert_eq!(diff.only_in_a(), 0);
    }

    #[test]
    fn mixed_changes_sorted_by_identity() {
        let a = profile(
            "A",
            "<classAccesses><apexClass>Foo</apexClass><enabled>true</enabled></classAccesses>\
             <pageAccesses><apexPage>Home</apexPage><enabled>true</enabled></pageAccesses>\
             <fullName>Admin</fullName>",
        );
        let b = profile(
            "B",
            "<classAccesses><apexClass>Foo</apexClass><enabled>false</enabled></classAccesses>\
             <classAccesses><apexClass>Bar</apexClass><enabled>true</enabled></classAccesses>\
             <fullName>Admin</fullName>",
        );
        let diff = diff_profiles(&a, &b);
        assert_eq!(diff.len(), 3);
        assert_eq!(diff.only_in_a(), 1);
        assert_eq!(diff.only_in_b(), 1);
        assert_eq!(diff.modifications(), 1);

        let ids: Vec<&str> = diff.changes.iter().map(ProfileChange::identity).collect();
        assert_eq!(ids, vec!["classAccesses:Bar", "classAccesses:Foo", "pageAccesses:Home"]);
        match &diff.changes[1] {
            ProfileChange::Modified(d) => assert_eq!(d.changed, vec!["enabled".to_string()]),
            other => panic!("expected Modified, got {:?}", other),
        }
    }

    #[test]
    fn serializes_tagged() {
        let a = profile("A", "<fullName>Admin</fullName>");
        let b = Profile::new("B");
        let json = serde_json::to_value(diff_profiles(&a, &b)).unwrap();
        assert_eq!(json["changes"][0]["kind"], "only_in_a");
        assert_eq!(json["changes"][0]["identity"], "fullName");
    }
}
