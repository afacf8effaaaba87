use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coordinate::ProjectKey;
use crate::error::VmanError;
use crate::missing_info::MissingInfo;
use crate::version_map::VersionMap;
use crate::ActivityLog;

/// Read-only snapshot of a session, consumed by reports and JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub workspace: PathBuf,
    pub backups: PathBuf,
    /// `versionless key -> approved version`, sorted by key
    pub version_map: BTreeMap<String, String>,
    pub boms: Vec<PathBuf>,
    pub bom_keys: BTreeSet<ProjectKey>,
    pub toolchain: Option<ProjectKey>,
    pub relocations: BTreeMap<String, ProjectKey>,
    /// loaded projects not descending from the toolchain
    pub outside_toolchain: BTreeSet<ProjectKey>,
    pub errors: BTreeMap<PathBuf, Vec<String>>,
    pub logs: BTreeMap<PathBuf, ActivityLog>,
    #[serde(flatten)]
    pub missing: MissingInfo,
}

impl SessionReport {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        workspace: PathBuf,
        backups: PathBuf,
        version_map: Option<&VersionMap>,
        errors: &BTreeMap<PathBuf, Vec<VmanError>>,
        logs: BTreeMap<PathBuf, ActivityLog>,
        missing: MissingInfo,
        toolchain: Option<ProjectKey>,
        relocations: BTreeMap<String, ProjectKey>,
        outside_toolchain: BTreeSet<ProjectKey>,
    ) -> Self {
        let (versions, boms, bom_keys) = version_map.map_or_else(Default::default, |map| {
            (
                map.iter()
                    .map(|(key, version)| (key.to_string(), version.to_string()))
                    .collect(),
                map.by_bom().keys().cloned().collect(),
                map.bom_keys().clone(),
            )
        });
        Self {
            generated_at: Utc::now(),
            workspace,
            backups,
            version_map: versions,
            boms,
            bom_keys,
            toolchain,
            relocations,
            outside_toolchain,
            errors: errors
                .iter()
                .map(|(path, errors)| {
                    (
                        path.clone(),
                        errors.iter().map(ToString::to_string).collect(),
                    )
                })
                .collect(),
            logs,
            missing,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Session, SessionOptions, VersionlessKey};
    use std::path::Path;

    #[test]
    fn test_report_snapshot() {
        let session = Session::new(SessionOptions::new("/ws"));
        session.log(Path::new("/a/pom.xml"), "Changing POM version from: 1.0 to: 2.0");
        session.add_error(
            Path::new("/b/pom.xml"),
            VmanError::MissingParentVersion {
                path: PathBuf::from("/b/pom.xml"),
            },
        );
        session.add_missing_version(Path::new("/a/pom.xml"), VersionlessKey::pom("g", "a"));

        let report = session.report();
        assert_eq!(report.error_count(), 1);
        assert!(report.outside_toolchain.is_empty());
        assert_eq!(report.logs.len(), 1);
        assert!(report.version_map.is_empty());
        assert_eq!(report.backups, PathBuf::from("/ws/backups"));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["missingVersions"]["g:a:pom"].is_array());
        assert!(json["errors"]["/b/pom.xml"][0]
            .as_str()
            .unwrap()
            .contains("Missing parent version"));
    }
}
