//! Tag name → category lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

use spm_types::ApiVersion;

use crate::category::CategoryDef;
use crate::table::CATEGORIES;

/// Read-only index over the category table.
///
/// Built once and shared; lookups never mutate it, so a single registry can
/// serve any number of concurrent merge runs.
#[derive(Debug)]
pub struct SchemaRegistry {
    by_name: HashMap<&'static str, &'static CategoryDef>,
}

impl SchemaRegistry {
    /// Index an arbitrary table of categories.
    pub fn from_table(table: &'static [CategoryDef]) -> Self {
        Self {
            by_name: table.iter().map(|c| (c.name, c)).collect(),
        }
    }

    /// The process-wide registry over the standard Salesforce Profile table.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| SchemaRegistry::from_table(CATEGORIES))
    }

    /// Look up a category by tag name, ignoring version.
    pub fn lookup(&self, tag: &str) -> Option<&'static CategoryDef> {
        self.by_name.get(tag).copied()
    }

    /// Look up a category that exists at `version`.
    pub fn lookup_at(&self, tag: &str, version: ApiVersion) -> Option<&'static CategoryDef> {
        self.lookup(tag).filter(|c| c.is_active(version))
    }

    /// All categories, sorted by tag name.
    pub fn categories(&self) -> Vec<&'static CategoryDef> {
        let mut all: Vec<_> = self.by_name.values().copied().collect();
        all.sort_by_key(|c| c.name);
        all
    }

    /// Categories that exist at `version`, sorted by tag name.
    pub fn active_at(&self, version: ApiVersion) -> Vec<&'static CategoryDef> {
        self.categories()
            .into_iter()
            .filter(|c| c.is_active(version))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Look up a category in the global registry.
pub fn lookup_category(tag: &str) -> Option<&'static CategoryDef> {
    SchemaRegistry::global().lookup(tag)
}
