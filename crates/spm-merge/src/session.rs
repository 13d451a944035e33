//! An A/B merge session.
//!
//! The session owns both input profiles and the merged result. After a
//! merge, individual records or toggle values can be copied from either
//! input onto the merged profile before it is saved.

use std::path::Path;

use serde::Serialize;
use spm_diff::ValueDiff;
use spm_profile::{Profile, ProfileError, ProfileState};
use spm_types::ApiVersion;
use tracing::{debug, info};

use crate::config::MergeConfig;
use crate::direction::{MergeDirection, Side};
use crate::engine::{merge_into, MERGED_NAME};
use crate::error::{MergeError, MergeResult};

/// Summary of one merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub direction: MergeDirection,
    pub version: ApiVersion,
    pub base_records: usize,
    pub overlay_records: usize,
    pub merged_records: usize,
    /// Identities present in both inputs with differing values.
    pub diffs: Vec<ValueDiff>,
}

/// A merge session over two profiles, A and B.
#[derive(Debug)]
pub struct ProfileMerger {
    version: ApiVersion,
    direction: MergeDirection,
    a: Option<Profile>,
    b: Option<Profile>,
    merged: Profile,
}

impl ProfileMerger {
    pub fn new(version: ApiVersion) -> Self {
        Self {
            version,
            direction: MergeDirection::default(),
            a: None,
            b: None,
            merged: Profile::with_version(MERGED_NAME, version),
        }
    }

    pub fn from_config(config: &MergeConfig) -> MergeResult<Self> {
        let mut merger = Self::new(config.version()?);
        merger.direction = config.direction();
        Ok(merger)
    }

    /// Scan `path` as profile A. Returns the number of records read.
    pub fn load_a(&mut self, path: impl AsRef<Path>) -> MergeResult<usize> {
        self.load(Side::A, path.as_ref())
    }

    /// Scan `path` as profile B. Returns the number of records read.
    pub fn load_b(&mut self, path: impl AsRef<Path>) -> MergeResult<usize> {
        self.load(Side::B, path.as_ref())
    }

    fn load(&mut self, side: Side, path: &Path) -> MergeResult<usize> {
        let profile = Profile::open(side.to_string(), path, self.version)?;
        let count = profile.len();
        *self.slot_mut(side) = Some(profile);
        Ok(count)
    }

    /// Install an already built profile as one side.
    pub fn set_profile(&mut self, side: Side, profile: Profile) -> MergeResult<()> {
        if profile.version() != self.version {
            let (base, overlay) = match side {
                Side::A => (profile.version(), self.version),
                Side::B => (self.version, profile.version()),
            };
            return Err(MergeError::VersionMismatch { base, overlay });
        }
        *self.slot_mut(side) = Some(profile);
        Ok(())
    }

    pub fn close_a(&mut self) -> Option<Profile> {
        self.a.take()
    }

    pub fn close_b(&mut self) -> Option<Profile> {
        self.b.take()
    }

    pub fn direction(&self) -> MergeDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: MergeDirection) {
        self.direction = direction;
    }

    pub fn toggle_direction(&mut self) -> MergeDirection {
        self.direction = self.direction.toggled();
        self.direction
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn profile(&self, side: Side) -> MergeResult<&Profile> {
        match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
        .ok_or(MergeError::MissingInput(side))
    }

    pub fn merged(&self) -> &Profile {
        &self.merged
    }

    pub fn merged_mut(&mut self) -> &mut Profile {
        &mut self.merged
    }

    /// Merge A and B according to the current direction.
    ///
    /// Both inputs are marked as merged afterwards.
    pub fn merge(&mut self) -> MergeResult<MergeReport> {
        let a = self.a.as_ref().ok_or(MergeError::MissingInput(Side::A))?;
        let b = self.b.as_ref().ok_or(MergeError::MissingInput(Side::B))?;
        let (base, overlay) = self.direction.roles(a, b);

        let diffs = merge_into(&mut self.merged, base, overlay)?;
        let report = MergeReport {
            direction: self.direction,
            version: self.version,
            base_records: base.len(),
            overlay_records: overlay.len(),
            merged_records: self.merged.len(),
            diffs,
        };

        for profile in [&mut self.a, &mut self.b].into_iter().flatten() {
            profile.set_state(ProfileState::Merged);
        }
        Ok(report)
    }

    /// Copy one toggle value from a side onto the matching merged record.
    ///
    /// The merged record is re-enabled if it had been disabled.
    pub fn apply_toggle(&mut self, side: Side, identity: &str, toggle: &str) -> MergeResult<()> {
        let source = self.profile(side)?.get(identity)?;
        let value = source
            .toggles()
            .get(toggle)
            .cloned()
            .ok_or_else(|| ProfileError::NotToggleable {
                category: source.category_name().to_string(),
                attribute: toggle.to_string(),
            })?;
        debug!(%side, identity, toggle, %value, "applying toggle");
        self.merged.update(identity, |record| {
            record.set(toggle, value)?;
            record.enable();
            Ok(())
        })?;
        Ok(())
    }

    /// Copy a whole record from a side onto the merged profile.
    pub fn apply_record(&mut self, side: Side, identity: &str) -> MergeResult<()> {
        let mut record = self.profile(side)?.get(identity)?.clone();
        record.enable();
        debug!(%side, identity, "applying record");
        self.merged.add(record)?;
        Ok(())
    }

    /// Copy every record of a side onto the merged profile. Returns how many
    /// records were copied.
    pub fn apply_all(&mut self, side: Side) -> MergeResult<usize> {
        let source = match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
        .ok_or(MergeError::MissingInput(side))?;
        let mut count = 0;
        for record in source.records() {
            let mut record = record.clone();
            record.enable();
            self.merged.add(record)?;
            count += 1;
        }
        info!(%side, records = count, "applied all records");
        Ok(count)
    }

    /// Write the merged profile to `path`.
    pub fn save_merged(&mut self, path: impl AsRef<Path>) -> MergeResult<()> {
        self.merged.save(path)?;
        Ok(())
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<Profile> {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::AttrValue;

    const V54: ApiVersion = ApiVersion(54);

    fn write_profile(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(
            &path,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Profile xmlns="http://soap.sforce.com/2006/04/metadata">{body}</Profile>"#
            ),
        )
        .unwrap();
        path
    }

    fn loaded() -> (tempfile::TempDir, ProfileMerger) {
        let dir = tempfile::tempdir().unwrap();
        let a = write_profile(
            dir.path(),
            "a.profile",
            "<objectPermissions><allowCreate>true</allowCreate><allowRead>true</allowRead><object>Account</object></objectPermissions>\
             <fullName>Admin</fullName>",
        );
        let b = write_profile(
            dir.path(),
            "b.profile",
            "<objectPermissions><allowCreate>false</allowCreate><allowRead>true</allowRead><object>Account</object></objectPermissions>\
             <custom>true</custom>",
        );
        let mut merger = ProfileMerger::new(V54);
        assert_eq!(merger.load_a(&a).unwrap(), 2);
        assert_eq!(merger.load_b(&b).unwrap(), 2);
        (dir, merger)
    }

    #[test]
    fn merge_requires_both_inputs() {
        let mut merger = ProfileMerger::new(V54);
        assert!(matches!(merger.merge(), Err(MergeError::MissingInput(Side::A))));
        merger.set_profile(Side::A, Profile::new("A")).unwrap();
        assert!(matches!(merger.merge(), Err(MergeError::MissingInput(Side::B))));
    }

    #[test]
    fn default_direction_lets_b_win() {
        let (_dir, mut merger) = loaded();
        let report = merger.merge().unwrap();
        assert_eq!(report.direction, MergeDirection::BIntoA);
        assert_eq!(report.merged_records, 3);
        assert_eq!(report.diffs.len(), 1);
        let merged = merger.merged().get("objectPermissions:Account").unwrap();
        assert_eq!(merged.get("allowCreate"), Some(&AttrValue::Bool(false)));
        assert_eq!(merger.profile(Side::A).unwrap().state(), ProfileState::Merged);
    }

    #[test]
    fn toggled_direction_lets_a_win() {
        let (_dir, mut merger) = loaded();
        assert_eq!(merger.toggle_direction(), MergeDirection::AIntoB);
        merger.merge().unwrap();
        let merged = merger.merged().get("objectPermissions:Account").unwrap();
        assert_eq!(merged.get("allowCreate"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn apply_toggle_copies_one_value_and_reenables() {
        let (_dir, mut merger) = loaded();
        merger.merge().unwrap();
        merger.merged_mut().disable("objectPermissions:Account").unwrap();
        merger
            .apply_toggle(Side::A, "objectPermissions:Account", "allowCreate")
            .unwrap();
        let merged = merger.merged().get("objectPermissions:Account").unwrap();
        assert_eq!(merged.get("allowCreate"), Some(&AttrValue::Bool(true)));
        assert!(!merged.is_disabled());
    }

    #[test]
    fn apply_toggle_rejects_non_toggles_and_missing_records() {
        let (_dir, mut merger) = loaded();
        merger.merge().unwrap();
        assert!(matches!(
            merger.apply_toggle(Side::A, "objectPermissions:Account", "object"),
            Err(MergeError::Profile(ProfileError::NotToggleable { .. }))
        ));
        assert!(matches!(
            merger.apply_toggle(Side::A, "classAccesses:Nope", "enabled"),
            Err(MergeError::Profile(ProfileError::FieldNotFound(_)))
        ));
    }

    #[test]
    fn apply_record_and_apply_all() {
        let (_dir, mut merger) = loaded();
        merger.merge().unwrap();
        merger.apply_record(Side::A, "objectPermissions:Account").unwrap();
        assert_eq!(
            merger.merged().get("objectPermissions:Account").unwrap().get("allowCreate"),
            Some(&AttrValue::Bool(true))
        );
        assert_eq!(merger.apply_all(Side::B).unwrap(), 2);
        assert_eq!(
            merger.merged().get("objectPermissions:Account").unwrap().get("allowCreate"),
            Some(&AttrValue::Bool(false))
        );
    }

    #[test]
    fn closing_a_side() {
        let (_dir, mut merger) = loaded();
        assert!(merger.close_a().is_some());
        assert!(matches!(merger.apply_all(Side::A), Err(MergeError::MissingInput(Side::A))));
        assert!(merger.close_a().is_none());
    }

    #[test]
    fn set_profile_checks_version() {
        let mut merger = ProfileMerger::new(V54);
        let old = Profile::with_version("old", ApiVersion(44));
        assert!(matches!(
            merger.set_profile(Side::B, old),
            Err(MergeError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn save_merged_writes_canonical_document() {
        let (dir, mut merger) = loaded();
        merger.merge().unwrap();
        let out = dir.path().join("merged.profile");
        merger.save_merged(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        let custom = text.find("<custom>true</custom>").unwrap();
        let name = text.find("<fullName>Admin</fullName>").unwrap();
        let perms = text.find("<objectPermissions>").unwrap();
        assert!(custom < name && name < perms);
        assert_eq!(merger.merged().state(), ProfileState::Serialized);
    }

    #[test]
    fn from_config_uses_version_and_direction() {
        let config = MergeConfig {
            api_version: 40,
            merge_a_into_b: true,
            ..MergeConfig::default()
        };
        let merger = ProfileMerger::from_config(&config).unwrap();
        assert_eq!(merger.version(), ApiVersion(40));
        assert_eq!(merger.direction(), MergeDirection::AIntoB);
    }
}
