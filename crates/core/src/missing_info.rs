use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::coordinate::{Coordinate, VersionlessKey};

/// Multi-map registries of things the version map could not account for.
///
/// Every insert is insert-if-absent: recording the same fact twice is a no-op.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingInfo {
    missing_versions: BTreeMap<VersionlessKey, BTreeSet<PathBuf>>,
    missing_dependencies: BTreeMap<VersionlessKey, BTreeSet<Coordinate>>,
    missing_parents: BTreeSet<PathBuf>,
    unmanaged_plugins: BTreeMap<PathBuf, BTreeSet<VersionlessKey>>,
    unmanaged_plugin_refs: BTreeMap<VersionlessKey, BTreeSet<Coordinate>>,
}

impl MissingInfo {
    /// Returns `true` if this file was not yet recorded for `key`.
    pub fn add_missing_version(&mut self, path: &Path, key: VersionlessKey) -> bool {
        self.missing_versions
            .entry(key)
            .or_default()
            .insert(path.to_path_buf())
    }

    pub fn add_missing_dependency(&mut self, declaration: &Coordinate) -> bool {
        self.missing_dependencies
            .entry(declaration.versionless_key())
            .or_default()
            .insert(declaration.clone())
    }

    pub fn add_missing_parent(&mut self, path: &Path) -> bool {
        self.missing_parents.insert(path.to_path_buf())
    }

    pub fn add_unmanaged_plugin(&mut self, path: &Path, plugin: &Coordinate) -> bool {
        let key = plugin.versionless_key();
        self.unmanaged_plugin_refs
            .entry(key.clone())
            .or_default()
            .insert(plugin.clone());
        self.unmanaged_plugins
            .entry(path.to_path_buf())
            .or_default()
            .insert(key)
    }

    pub fn missing_versions(&self) -> &BTreeMap<VersionlessKey, BTreeSet<PathBuf>> {
        &self.missing_versions
    }

    /// Keys recorded as missing for one file.
    #[must_use]
    pub fn missing_versions_for(&self, path: &Path) -> BTreeSet<VersionlessKey> {
        self.missing_versions
            .iter()
            .filter(|(_, files)| files.contains(path))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn missing_dependencies(&self) -> &BTreeMap<VersionlessKey, BTreeSet<Coordinate>> {
        &self.missing_dependencies
    }

    pub fn missing_parents(&self) -> &BTreeSet<PathBuf> {
        &self.missing_parents
    }

    pub fn unmanaged_plugins(&self) -> &BTreeMap<PathBuf, BTreeSet<VersionlessKey>> {
        &self.unmanaged_plugins
    }

    pub fn unmanaged_plugin_refs(&self) -> &BTreeMap<VersionlessKey, BTreeSet<Coordinate>> {
        &self.unmanaged_plugin_refs
    }
}
