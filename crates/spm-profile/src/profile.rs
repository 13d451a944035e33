//! The profile container: a named, identity-keyed set of field records.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spm_schema::SchemaRegistry;
use spm_types::{ApiVersion, DEFAULT_API_VERSION};
use tracing::{debug, info};

use crate::error::{ProfileError, ProfileResult};
use crate::record::FieldRecord;
use crate::scanner::scan_document;
use crate::serializer::render_profile;

/// Lifecycle stage of a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileState {
    #[default]
    Empty,
    Scanned,
    Merged,
    Serialized,
}

/// A named profile: identity key → field record.
///
/// Records are kept sorted by identity, which is also the order the
/// serializer writes them in.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    name: String,
    namespace: Option<String>,
    path: Option<PathBuf>,
    version: ApiVersion,
    state: ProfileState,
    fields: BTreeMap<String, FieldRecord>,
}

impl Profile {
    /// Create an empty profile at the default API version.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_version(name, DEFAULT_API_VERSION)
    }

    /// Create an empty profile at `version`.
    pub fn with_version(name: impl Into<String>, version: ApiVersion) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            path: None,
            version,
            state: ProfileState::Empty,
            fields: BTreeMap::new(),
        }
    }

    /// Create a profile and scan `path` into it.
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>, version: ApiVersion) -> ProfileResult<Self> {
        let mut profile = Self::with_version(name, version);
        profile.scan_file(path)?;
        Ok(profile)
    }

    /// Replace the contents with the records of the file at `path`.
    ///
    /// On a parse or read failure the profile is left untouched.
    pub fn scan_file(&mut self, path: impl AsRef<Path>) -> ProfileResult<usize> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| ProfileError::io(path, e))?;
        let count = self.scan_str(&document)?;
        self.path = Some(path.to_path_buf());
        info!(profile = %self.name, path = %path.display(), records = count, "scanned profile");
        Ok(count)
    }

    /// Replace the contents with the records of `document`.
    pub fn scan_str(&mut self, document: &str) -> ProfileResult<usize> {
        let outcome = scan_document(document, self.version, SchemaRegistry::global())?;
        if !outcome.skipped.is_empty() {
            debug!(profile = %self.name, skipped = outcome.skipped.len(), "skipped top-level elements");
        }
        self.clear();
        self.namespace = outcome.namespace;
        self.fields = outcome.records;
        self.state = ProfileState::Scanned;
        Ok(self.fields.len())
    }

    /// Scan the profile's own file again.
    pub fn rescan(&mut self) -> ProfileResult<usize> {
        let path = self.path.clone().ok_or_else(|| ProfileError::NoPath(self.name.clone()))?;
        self.scan_file(path)
    }

    /// Canonical XML text of the enabled records.
    pub fn to_xml(&self) -> ProfileResult<String> {
        render_profile(self.fields.values(), self.version)
    }

    /// Serialize and write to `path`, remembering it as the profile's path.
    ///
    /// The document is rendered completely and written to a temporary file in
    /// the destination directory, which then replaces `path`; a failed save
    /// leaves no partial file behind.
    pub fn save(&mut self, path: impl AsRef<Path>) -> ProfileResult<()> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        write_atomic(path, xml.as_bytes())?;
        self.path = Some(path.to_path_buf());
        self.state = ProfileState::Serialized;
        info!(profile = %self.name, path = %path.display(), bytes = xml.len(), "saved profile");
        Ok(())
    }

    /// Insert a record, replacing any record with the same identity.
    ///
    /// The record must have been built under the profile's API version.
    pub fn add(&mut self, record: FieldRecord) -> ProfileResult<Option<FieldRecord>> {
        if record.version() != self.version {
            return Err(ProfileError::VersionMismatch {
                identity: record.identity().to_string(),
                expected: self.version,
                found: record.version(),
            });
        }
        Ok(self.fields.insert(record.identity().to_string(), record))
    }

    pub fn remove(&mut self, identity: &str) -> ProfileResult<FieldRecord> {
        self.fields
            .remove(identity)
            .ok_or_else(|| ProfileError::FieldNotFound(identity.to_string()))
    }

    pub fn get(&self, identity: &str) -> ProfileResult<&FieldRecord> {
        self.fields
            .get(identity)
            .ok_or_else(|| ProfileError::FieldNotFound(identity.to_string()))
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.fields.contains_key(identity)
    }

    /// Edit a record in place.
    ///
    /// If the edit changes the record's identity it is re-keyed, replacing
    /// any record already holding the new identity. Returns the identity the
    /// record ends up under.
    pub fn update<F>(&mut self, identity: &str, edit: F) -> ProfileResult<String>
    where
        F: FnOnce(&mut FieldRecord) -> ProfileResult<()>,
    {
        let mut record = self
            .fields
            .remove(identity)
            .ok_or_else(|| ProfileError::FieldNotFound(identity.to_string()))?;
        let result = edit(&mut record);
        let key = record.identity().to_string();
        if key != identity {
            debug!(from = identity, to = %key, "record re-keyed after edit");
        }
        self.fields.insert(key.clone(), record);
        result.map(|()| key)
    }

    pub fn enable(&mut self, identity: &str) -> ProfileResult<()> {
        self.update(identity, |r| {
            r.enable();
            Ok(())
        })
        .map(drop)
    }

    pub fn disable(&mut self, identity: &str) -> ProfileResult<()> {
        self.update(identity, |r| {
            r.disable();
            Ok(())
        })
        .map(drop)
    }

    /// Enable or disable every record of one category. Returns how many
    /// records were touched.
    pub fn set_category_disabled(&mut self, category: &str, disabled: bool) -> usize {
        let mut touched = 0;
        for record in self.fields.values_mut().filter(|r| r.category_name() == category) {
            record.set_disabled(disabled);
            touched += 1;
        }
        touched
    }

    /// Remove every record and forget the namespace and path.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.namespace = None;
        self.path = None;
        self.state = ProfileState::Empty;
    }

    /// Records grouped by category name, each group in identity order.
    pub fn by_category(&self) -> BTreeMap<&'static str, Vec<&FieldRecord>> {
        let mut groups: BTreeMap<&'static str, Vec<&FieldRecord>> = BTreeMap::new();
        for record in self.fields.values() {
            groups.entry(record.category_name()).or_default().push(record);
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRecord)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn records(&self) -> impl Iterator<Item = &FieldRecord> {
        self.fields.values()
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn state(&self) -> ProfileState {
        self.state
    }

    pub fn set_state(&mut self, state: ProfileState) {
        self.state = state;
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Profile {}: {} fields>", self.name, self.fields.len())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> ProfileResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ProfileError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| ProfileError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| ProfileError::io(path, e))?;
    tmp.persist(path).map_err(|e| ProfileError::io(path, e.error))?;
    Ok(())
}
