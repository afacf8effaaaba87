use std::path::{Path, PathBuf};

use crate::coordinate::{Coordinate, POM_TYPE, ProjectKey};

/// Single dependency entry, either inline or in the managed section.
///
/// A declaration without a version is inherited from a managed entry elsewhere
/// and must never be modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    coordinate: Coordinate,
    managed: bool,
    scope: Option<String>,
}

impl DependencyDeclaration {
    #[must_use]
    pub const fn new(coordinate: Coordinate, managed: bool) -> Self {
        Self {
            coordinate,
            managed,
            scope: None,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn version(&self) -> Option<&str> {
        self.coordinate.version()
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.coordinate.set_version(version);
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn is_inherited(&self) -> bool {
        self.coordinate.version().is_none()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

/// One build descriptor file, read into memory and rewritten in place.
///
/// `path` is the identity of a descriptor; the loader never yields two
/// descriptors with the same path.
#[derive(Debug, Clone)]
pub struct Descriptor {
    path: PathBuf,
    coordinate: Coordinate,
    parent: Option<Coordinate>,
    dependencies: Vec<DependencyDeclaration>,
    managed_dependencies: Vec<DependencyDeclaration>,
    modules: Vec<String>,
    plugins: Vec<Coordinate>,
    source: String,
}

impl Descriptor {
    /// `coordinate` carries the packaging as its type; its group must already
    /// be resolved against the parent when the file omits one.
    #[must_use]
    pub fn new(path: PathBuf, coordinate: Coordinate, parent: Option<Coordinate>) -> Self {
        Self {
            path,
            coordinate,
            parent,
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            modules: Vec::new(),
            plugins: Vec::new(),
            source: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn coordinate_mut(&mut self) -> &mut Coordinate {
        &mut self.coordinate
    }

    pub fn parent(&self) -> Option<&Coordinate> {
        self.parent.as_ref()
    }

    pub fn parent_mut(&mut self) -> Option<&mut Coordinate> {
        self.parent.as_mut()
    }

    pub fn packaging(&self) -> &str {
        self.coordinate.kind()
    }

    pub fn dependencies(&self) -> &[DependencyDeclaration] {
        &self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut [DependencyDeclaration] {
        &mut self.dependencies
    }

    pub fn managed_dependencies(&self) -> &[DependencyDeclaration] {
        &self.managed_dependencies
    }

    pub fn managed_dependencies_mut(&mut self) -> &mut [DependencyDeclaration] {
        &mut self.managed_dependencies
    }

    /// Adds a declaration to the section its `managed` flag names.
    pub fn add_dependency(&mut self, declaration: DependencyDeclaration) {
        if declaration.is_managed() {
            self.managed_dependencies.push(declaration);
        } else {
            self.dependencies.push(declaration);
        }
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn add_module(&mut self, module: impl Into<String>) {
        self.modules.push(module.into());
    }

    pub fn plugins(&self) -> &[Coordinate] {
        &self.plugins
    }

    pub fn add_plugin(&mut self, plugin: Coordinate) {
        self.plugins.push(plugin);
    }

    /// Raw text the descriptor was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: String) {
        self.source = source;
    }

    /// Own version, falling back to the parent's version.
    #[must_use]
    pub fn effective_version(&self) -> Option<&str> {
        self.coordinate
            .version()
            .or_else(|| self.parent.as_ref().and_then(Coordinate::version))
    }

    /// Full key of this project, using the inherited version if needed.
    #[must_use]
    pub fn project_key(&self) -> Option<ProjectKey> {
        self.effective_version().map(|version| {
            ProjectKey::new(
                self.coordinate.group(),
                self.coordinate.artifact(),
                version,
            )
        })
    }

    /// Full key of the parent reference, if it declares a version.
    #[must_use]
    pub fn parent_key(&self) -> Option<ProjectKey> {
        self.parent.as_ref().and_then(Coordinate::project_key)
    }
}

/// Build a parent reference coordinate. Parents are always of type `pom`.
#[must_use]
pub fn parent_coordinate(group: &str, artifact: &str, version: Option<String>) -> Coordinate {
    Coordinate::new(group, artifact, version, POM_TYPE)
}
