use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use crate::coordinate::{ProjectKey, VersionlessKey};
use crate::descriptor::Descriptor;
use crate::error::VmanError;

/// Approved versions, keyed by versionless coordinate.
///
/// Frozen once built; the session hands out shared references only.
#[derive(Debug, Default, Clone)]
pub struct VersionMap {
    versions: HashMap<VersionlessKey, String>,
    by_bom: BTreeMap<PathBuf, BTreeMap<VersionlessKey, String>>,
    bom_keys: BTreeSet<ProjectKey>,
}

impl VersionMap {
    pub fn get(&self, key: &VersionlessKey) -> Option<&str> {
        self.versions.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &VersionlessKey) -> bool {
        self.versions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VersionlessKey, &str)> {
        self.versions.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Entries each BOM file contributed, in BOM path order.
    pub fn by_bom(&self) -> &BTreeMap<PathBuf, BTreeMap<VersionlessKey, String>> {
        &self.by_bom
    }

    pub fn bom_keys(&self) -> &BTreeSet<ProjectKey> {
        &self.bom_keys
    }
}

/// Accumulates BOM descriptors into a [`VersionMap`].
///
/// Later BOMs override earlier ones for the same key.
#[derive(Debug, Default)]
pub struct VersionMapBuilder {
    map: VersionMap,
}

impl VersionMapBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every versioned managed entry of `bom` under both its
    /// `group:artifact:pom` key and its natural key.
    ///
    /// Returns the keys whose previously recorded version was replaced.
    pub fn add_bom(&mut self, bom: &Descriptor) -> Vec<VmanError> {
        let mut conflicts = Vec::new();
        let mut contributed = BTreeMap::new();

        for declaration in bom.managed_dependencies() {
            let Some(version) = declaration.version() else {
                continue;
            };
            let coordinate = declaration.coordinate();
            for key in [coordinate.pom_key(), coordinate.versionless_key()] {
                if let Some(previous) = self.map.versions.get(&key)
                    && previous != version
                    && !contributed.contains_key(&key)
                {
                    conflicts.push(VmanError::BomConflict {
                        key: key.clone(),
                        previous: previous.clone(),
                        current: version.to_string(),
                    });
                }
                self.map.versions.insert(key.clone(), version.to_string());
                contributed.insert(key, version.to_string());
            }
        }

        if let Some(key) = bom.project_key() {
            self.map.bom_keys.insert(key);
        }
        self.map.by_bom.insert(bom.path().to_path_buf(), contributed);
        conflicts
    }

    #[must_use]
    pub fn build(self) -> VersionMap {
        self.map
    }
}
