use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::fs::create_dir_all;

use crate::ancestry_graph::{AncestryGraph, ParentLink};
use crate::config::Config;
use crate::coordinate::{Coordinate, ProjectKey, VersionlessKey};
use crate::descriptor::Descriptor;
use crate::error::VmanError;
use crate::missing_info::MissingInfo;
use crate::session_report::SessionReport;
use crate::version_map::VersionMap;
use crate::ActivityLog;

/// Settings a [`Session`] is created with.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub workspace: PathBuf,
    pub reports: Option<PathBuf>,
    pub version_suffix: Option<String>,
    pub preserve_dirs: bool,
    pub recursive: bool,
    pub toolchain: Option<ProjectKey>,
    pub strict_bom_conflicts: bool,
}

impl SessionOptions {
    #[must_use]
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns error if the configured toolchain is not a `group:artifact:version` key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let toolchain = config
            .toolchain
            .as_deref()
            .map(str::parse::<ProjectKey>)
            .transpose()
            .context("Invalid toolchain in configuration")?;
        Ok(Self {
            workspace: config.workspace.clone(),
            reports: Some(config.reports_dir()),
            version_suffix: config.version_suffix.clone().filter(|s| !s.is_empty()),
            preserve_dirs: config.preserve_dirs,
            recursive: config.recursive,
            toolchain,
            strict_bom_conflicts: config.strict_bom_conflicts,
        })
    }
}

#[derive(Debug, Default)]
struct SessionState {
    logs: BTreeMap<PathBuf, ActivityLog>,
    errors: BTreeMap<PathBuf, Vec<VmanError>>,
    missing: MissingInfo,
    relocations: BTreeMap<String, ProjectKey>,
    toolchain: Option<ProjectKey>,
    loaded: HashSet<ProjectKey>,
    ancestry: Option<AncestryGraph>,
}

impl SessionState {
    fn ancestry(&mut self) -> &mut AncestryGraph {
        let toolchain = self.toolchain.clone();
        self.ancestry
            .get_or_insert_with(|| AncestryGraph::new(toolchain))
    }

    fn outside_toolchain(&self) -> BTreeSet<ProjectKey> {
        if self.toolchain.is_none() {
            return BTreeSet::new();
        }
        self.loaded
            .iter()
            .filter(|key| {
                !self
                    .ancestry
                    .as_ref()
                    .is_some_and(|graph| graph.has_toolchain_ancestor(key))
            })
            .cloned()
            .collect()
    }

    fn is_toolchain_reference(&self, parent: &Coordinate) -> bool {
        self.toolchain.as_ref().is_some_and(|toolchain| {
            toolchain.group() == parent.group() && toolchain.artifact() == parent.artifact()
        })
    }
}

/// Run-scoped state shared by every component of one rewrite run.
///
/// Created once by the driver and passed explicitly. All registries sit behind
/// one coarse lock, so a `&Session` can be shared between workers; the version
/// map is set at most once and read without locking afterwards.
#[derive(Debug)]
pub struct Session {
    workspace: PathBuf,
    backups: PathBuf,
    downloads: PathBuf,
    reports: PathBuf,
    version_suffix: Option<String>,
    preserve_dirs: bool,
    recursive: bool,
    strict_bom_conflicts: bool,
    version_map: OnceLock<Arc<VersionMap>>,
    state: Mutex<SessionState>,
}

impl Session {
    /// In-memory session; no directories are created.
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        let workspace = options.workspace;
        Self {
            backups: workspace.join("backups"),
            downloads: workspace.join("downloads"),
            reports: options
                .reports
                .unwrap_or_else(|| workspace.join("reports")),
            workspace,
            version_suffix: options.version_suffix,
            preserve_dirs: options.preserve_dirs,
            recursive: options.recursive,
            strict_bom_conflicts: options.strict_bom_conflicts,
            version_map: OnceLock::new(),
            state: Mutex::new(SessionState {
                toolchain: options.toolchain,
                ..SessionState::default()
            }),
        }
    }

    /// Session whose workspace, backups and downloads directories exist.
    ///
    /// # Errors
    /// Returns error if any of the directories cannot be created.
    pub async fn create(options: SessionOptions) -> Result<Self> {
        let session = Self::new(options);
        for dir in [&session.workspace, &session.backups, &session.downloads] {
            create_dir_all(dir)
                .await
                .context(format!("Failed to create directory - {}", dir.display()))?;
        }
        Ok(session)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn downloads(&self) -> &Path {
        &self.downloads
    }

    pub fn reports(&self) -> &Path {
        &self.reports
    }

    pub fn version_suffix(&self) -> Option<&str> {
        self.version_suffix.as_deref()
    }

    pub fn preserve_dirs(&self) -> bool {
        self.preserve_dirs
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn strict_bom_conflicts(&self) -> bool {
        self.strict_bom_conflicts
    }

    /// Approved version for a project or parent, with the suffix appended once.
    #[must_use]
    pub fn suffixed_version(&self, version: &str) -> String {
        match self.version_suffix.as_deref() {
            Some(suffix) if !version.ends_with(suffix) => format!("{version}{suffix}"),
            _ => version.to_string(),
        }
    }

    pub fn log(&self, path: &Path, message: impl Into<String>) {
        self.state
            .lock()
            .logs
            .entry(path.to_path_buf())
            .or_default()
            .add(message);
    }

    #[must_use]
    pub fn log_for(&self, path: &Path) -> ActivityLog {
        self.state.lock().logs.get(path).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn logs(&self) -> BTreeMap<PathBuf, ActivityLog> {
        self.state.lock().logs.clone()
    }

    pub fn add_error(&self, path: &Path, error: VmanError) {
        self.state
            .lock()
            .errors
            .entry(path.to_path_buf())
            .or_default()
            .push(error);
    }

    #[must_use]
    pub fn errors_for(&self, path: &Path) -> Vec<VmanError> {
        self.state.lock().errors.get(path).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn errors(&self) -> BTreeMap<PathBuf, Vec<VmanError>> {
        self.state.lock().errors.clone()
    }

    pub fn error_count(&self) -> usize {
        self.state.lock().errors.values().map(Vec::len).sum()
    }

    pub fn add_missing_version(&self, path: &Path, key: VersionlessKey) -> bool {
        self.state.lock().missing.add_missing_version(path, key)
    }

    pub fn add_missing_dependency(&self, declaration: &Coordinate) -> bool {
        self.state.lock().missing.add_missing_dependency(declaration)
    }

    pub fn add_missing_parent(&self, path: &Path) -> bool {
        self.state.lock().missing.add_missing_parent(path)
    }

    pub fn add_unmanaged_plugin(&self, path: &Path, plugin: &Coordinate) -> bool {
        self.state.lock().missing.add_unmanaged_plugin(path, plugin)
    }

    #[must_use]
    pub fn missing_info(&self) -> MissingInfo {
        self.state.lock().missing.clone()
    }

    pub fn version_map(&self) -> Option<Arc<VersionMap>> {
        self.version_map.get().cloned()
    }

    /// Freezes `map` as the session's version map, unless one is already set.
    /// Returns the map in effect.
    pub fn set_version_map(&self, map: VersionMap) -> Arc<VersionMap> {
        Arc::clone(self.version_map.get_or_init(|| Arc::new(map)))
    }

    /// Registers that `from` (`group:artifact`) moved to `to`.
    pub fn add_relocation(&self, from: impl Into<String>, to: ProjectKey) {
        self.state.lock().relocations.insert(from.into(), to);
    }

    pub fn relocation(&self, key: &VersionlessKey) -> Option<ProjectKey> {
        self.state.lock().relocations.get(&key.artifact_ref()).cloned()
    }

    #[must_use]
    pub fn relocations(&self) -> BTreeMap<String, ProjectKey> {
        self.state.lock().relocations.clone()
    }

    pub fn toolchain(&self) -> Option<ProjectKey> {
        self.state.lock().toolchain.clone()
    }

    /// Registers loaded projects in the ancestry graph.
    ///
    /// All projects are registered before any parent edge is resolved, so the
    /// order of `descriptors` does not matter. A parent that is neither loaded
    /// nor the toolchain goes to the missing-parent registry; an edge that
    /// would close a cycle is recorded as an error against the child's file.
    pub fn add_projects(&self, descriptors: &[Descriptor]) {
        let mut state = self.state.lock();
        for descriptor in descriptors {
            if let Some(key) = descriptor.project_key() {
                state.loaded.insert(key);
            }
        }

        for descriptor in descriptors {
            let Some(key) = descriptor.project_key() else {
                continue;
            };
            let link = match (descriptor.parent(), descriptor.parent_key()) {
                (None, _) | (Some(_), None) => ParentLink::None,
                (Some(parent), Some(_)) if state.is_toolchain_reference(parent) => {
                    ParentLink::Toolchain
                }
                (Some(_), Some(parent_key)) if state.loaded.contains(&parent_key) => {
                    ParentLink::Loaded(parent_key)
                }
                (Some(_), Some(parent_key)) => ParentLink::Unresolved(parent_key),
            };
            if matches!(link, ParentLink::Unresolved(_)) {
                state.missing.add_missing_parent(descriptor.path());
            }
            if let Err(error) = state.ancestry().connect(&key, &link) {
                state
                    .errors
                    .entry(descriptor.path().to_path_buf())
                    .or_default()
                    .push(error);
            }
        }
    }

    pub fn ancestry_graph_contains(&self, key: &ProjectKey) -> bool {
        self.state.lock().ancestry().contains(key)
    }

    /// Loaded projects whose parent chain does not reach the toolchain.
    /// Empty when no toolchain is configured.
    #[must_use]
    pub fn outside_toolchain(&self) -> BTreeSet<ProjectKey> {
        self.state.lock().outside_toolchain()
    }

    /// Snapshot of every registry, for the reporting side.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        let version_map = self.version_map();
        let state = self.state.lock();
        let outside_toolchain = state.outside_toolchain();
        SessionReport::new(
            self.workspace.clone(),
            self.backups.clone(),
            version_map.as_deref(),
            &state.errors,
            state.logs.clone(),
            state.missing.clone(),
            state.toolchain.clone(),
            state.relocations.clone(),
            outside_toolchain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::parent_coordinate;
    use crate::version_map::VersionMapBuilder;
    use tempfile::TempDir;

    fn project(path: &str, key: &str, parent: Option<&str>) -> Descriptor {
        let key: ProjectKey = key.parse().unwrap();
        let parent = parent.map(|p| {
            let p: ProjectKey = p.parse().unwrap();
            parent_coordinate(p.group(), p.artifact(), Some(p.version().to_string()))
        });
        Descriptor::new(
            PathBuf::from(path),
            Coordinate::new(
                key.group(),
                key.artifact(),
                Some(key.version().to_string()),
                "jar",
            ),
            parent,
        )
    }

    #[tokio::test]
    async fn test_create_makes_directories() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = temp_dir.path().join("ws");

        let session = Session::create(SessionOptions::new(&workspace)).await.unwrap();
        assert!(session.backups().is_dir());
        assert!(session.downloads().is_dir());
        assert_eq!(session.reports(), workspace.join("reports"));

        temp_dir.close().unwrap();
    }

    #[test]
    fn test_logs_are_created_on_first_access() {
        let session = Session::new(SessionOptions::new("/ws"));
        assert!(session.log_for(Path::new("/a/pom.xml")).is_empty());

        session.log(Path::new("/a/pom.xml"), "one");
        session.log(Path::new("/a/pom.xml"), "two");
        assert_eq!(
            session.log_for(Path::new("/a/pom.xml")).messages(),
            &["one", "two"]
        );
        assert_eq!(session.logs().len(), 1);
    }

    #[test]
    fn test_errors_accumulate_per_file() {
        let session = Session::new(SessionOptions::new("/ws"));
        let path = Path::new("/a/pom.xml");
        session.add_error(path, VmanError::MissingParentVersion { path: path.into() });
        session.add_error(path, VmanError::parse(path, "bad"));

        assert_eq!(session.errors_for(path).len(), 2);
        assert_eq!(session.error_count(), 2);
        assert!(session.errors_for(Path::new("/b/pom.xml")).is_empty());
    }

    #[test]
    fn test_version_map_is_set_once() {
        let session = Session::new(SessionOptions::new("/ws"));
        assert!(session.version_map().is_none());

        let first = session.set_version_map(VersionMapBuilder::new().build());
        let mut builder = VersionMapBuilder::new();
        let mut bom = project("/bom.xml", "g:bom:1", None);
        bom.add_dependency(crate::DependencyDeclaration::new(
            Coordinate::new("g", "a", Some("1".to_string()), "jar"),
            true,
        ));
        builder.add_bom(&bom);
        let second = session.set_version_map(builder.build());

        assert!(Arc::ptr_eq(&first, &second));
        assert!(session.version_map().unwrap().is_empty());
    }

    #[test]
    fn test_suffixed_version() {
        let session = Session::new(SessionOptions {
            version_suffix: Some("-rh1".to_string()),
            ..SessionOptions::new("/ws")
        });
        assert_eq!(session.suffixed_version("2.0"), "2.0-rh1");
        assert_eq!(session.suffixed_version("2.0-rh1"), "2.0-rh1");

        let plain = Session::new(SessionOptions::new("/ws"));
        assert_eq!(plain.suffixed_version("2.0"), "2.0");
    }

    #[test]
    fn test_add_projects_builds_graph_in_any_order() {
        let session = Session::new(SessionOptions {
            toolchain: Some("org.tools:toolchain:1".parse().unwrap()),
            ..SessionOptions::new("/ws")
        });
        session.add_projects(&[
            project("/tree/child/pom.xml", "g:child:1", Some("g:parent:1")),
            project("/tree/pom.xml", "g:parent:1", Some("org.tools:toolchain:9")),
            project("/other/pom.xml", "g:orphan:1", Some("g:gone:1")),
        ]);

        let child: ProjectKey = "g:child:1".parse().unwrap();
        assert!(session.ancestry_graph_contains(&child));
        let orphan: ProjectKey = "g:orphan:1".parse().unwrap();
        assert_eq!(session.outside_toolchain(), BTreeSet::from([orphan.clone()]));
        assert_eq!(
            session.report().outside_toolchain,
            BTreeSet::from([orphan])
        );

        let missing = session.missing_info();
        assert!(missing.missing_parents().contains(Path::new("/other/pom.xml")));
        assert_eq!(missing.missing_parents().len(), 1);
        assert_eq!(session.error_count(), 0);
    }

    #[test]
    fn test_add_projects_records_cycle_error() {
        let session = Session::new(SessionOptions::new("/ws"));
        session.add_projects(&[
            project("/a/pom.xml", "g:a:1", Some("g:b:1")),
            project("/b/pom.xml", "g:b:1", Some("g:a:1")),
        ]);

        let errors = session.errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.values().next().unwrap()[0],
            VmanError::AncestryCycle { .. }
        ));
    }

    #[test]
    fn test_relocation_lookup_ignores_type() {
        let session = Session::new(SessionOptions::new("/ws"));
        session.add_relocation("old:lib", "new:lib:2".parse().unwrap());
        let found = session.relocation(&VersionlessKey::new("old", "lib", "jar"));
        assert_eq!(found.unwrap().to_string(), "new:lib:2");
        assert!(session.relocation(&VersionlessKey::pom("x", "y")).is_none());
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            toolchain: Some("org.tools:toolchain:1".to_string()),
            version_suffix: Some(String::new()),
            recursive: true,
            ..Config::default()
        };
        let options = SessionOptions::from_config(&config).unwrap();
        assert!(options.recursive);
        assert_eq!(options.version_suffix, None);
        assert_eq!(options.toolchain.unwrap().to_string(), "org.tools:toolchain:1");

        let invalid = Config {
            toolchain: Some("broken".to_string()),
            ..Config::default()
        };
        assert!(SessionOptions::from_config(&invalid).is_err());
    }

    #[test]
    fn test_session_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}
