//! The base/overlay merge.

use spm_diff::{diff_records, ValueDiff};
use spm_profile::{Profile, ProfileState};
use tracing::info;

use crate::error::{MergeError, MergeResult};

/// Name given to the profile produced by [`merge`].
pub const MERGED_NAME: &str = "merged";

/// Merge `overlay` onto `base` into a new profile.
pub fn merge(base: &Profile, overlay: &Profile) -> MergeResult<(Profile, Vec<ValueDiff>)> {
    let mut merged = Profile::with_version(MERGED_NAME, base.version());
    let diffs = merge_into(&mut merged, base, overlay)?;
    Ok((merged, diffs))
}

/// Merge `overlay` onto `base`, replacing the contents of `merged`.
///
/// Every base record is copied, then every overlay record is copied over it.
/// An overlay record replaces a base record with the same identity as a
/// whole; when the two disagree on any attribute a [`ValueDiff`] is
/// reported. The result holds the union of both identity sets, and the
/// diffs come out in ascending identity order.
///
/// Both inputs must share one API version. `merged` takes that version and
/// the base namespace, falling back to the overlay's.
pub fn merge_into(merged: &mut Profile, base: &Profile, overlay: &Profile) -> MergeResult<Vec<ValueDiff>> {
    if base.version() != overlay.version() {
        return Err(MergeError::VersionMismatch {
            base: base.version(),
            overlay: overlay.version(),
        });
    }

    let name = merged.name().to_string();
    *merged = Profile::with_version(name, base.version());
    merged.set_namespace(
        base.namespace()
            .or_else(|| overlay.namespace())
            .map(str::to_string),
    );

    for record in base.records() {
        merged.add(record.clone())?;
    }

    let mut diffs = Vec::new();
    for record in overlay.records() {
        if let Ok(existing) = merged.get(record.identity()) {
            if let Some(diff) = diff_records(existing, record) {
                diffs.push(diff);
            }
        }
        merged.add(record.clone())?;
    }

    merged.set_state(ProfileState::Merged);
    info!(
        base = base.name(),
        overlay = overlay.name(),
        base_records = base.len(),
        overlay_records = overlay.len(),
        merged_records = merged.len(),
        diffs = diffs.len(),
        "merged profiles"
    );
    Ok(diffs)
}
