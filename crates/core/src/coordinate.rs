use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use serde::{Serialize, Serializer};

/// Type used for descriptor, parent and BOM lookups.
pub const POM_TYPE: &str = "pom";

/// Type a dependency declaration has when none is declared.
pub const DEFAULT_DEPENDENCY_TYPE: &str = "jar";

/// Identity of a build unit: group, artifact, optional version and type.
///
/// The identity part (everything but the version) never changes once read.
/// Rewriting replaces the version only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group: String,
    artifact: String,
    version: Option<String>,
    kind: String,
    classifier: Option<String>,
}

impl Coordinate {
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: Option<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version,
            kind: kind.into(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Natural management key: `group:artifact:type[:classifier]`.
    #[must_use]
    pub fn versionless_key(&self) -> VersionlessKey {
        VersionlessKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            kind: self.kind.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// Key used for project-level lookups: `group:artifact:pom`.
    #[must_use]
    pub fn pom_key(&self) -> VersionlessKey {
        VersionlessKey::pom(&self.group, &self.artifact)
    }

    /// Full `group:artifact:version` key, if a version is declared.
    #[must_use]
    pub fn project_key(&self) -> Option<ProjectKey> {
        self.version
            .as_ref()
            .map(|version| ProjectKey::new(&self.group, &self.artifact, version))
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            self.versionless_key(),
            self.version.as_deref().unwrap_or("-")
        )
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Coordinate identity without version, used to look up approved versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionlessKey {
    group: String,
    artifact: String,
    kind: String,
    classifier: Option<String>,
}

impl VersionlessKey {
    #[must_use]
    pub fn new(group: &str, artifact: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            kind: kind.to_string(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn pom(group: &str, artifact: &str) -> Self {
        Self::new(group, artifact, POM_TYPE)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// `group:artifact`, the form relocations are keyed by.
    #[must_use]
    pub fn artifact_ref(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl Display for VersionlessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.kind)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionlessKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let parts = value.split(':').collect::<Vec<_>>();
        match parts.as_slice() {
            [group, artifact] => Ok(Self::new(group, artifact, DEFAULT_DEPENDENCY_TYPE)),
            [group, artifact, kind] => Ok(Self::new(group, artifact, kind)),
            [group, artifact, kind, classifier] => Ok(Self {
                classifier: Some((*classifier).to_string()),
                ..Self::new(group, artifact, kind)
            }),
            _ => Err(anyhow::anyhow!("Invalid versionless key: {value}")),
        }
    }
}

impl Serialize for VersionlessKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Full `group:artifact:version` identity of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectKey {
    group: String,
    artifact: String,
    version: String,
}

impl ProjectKey {
    #[must_use]
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Display for ProjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for ProjectKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.splitn(3, ':');
        let group = parts.next().filter(|p| !p.is_empty());
        let artifact = parts.next().filter(|p| !p.is_empty());
        let version = parts.next().filter(|p| !p.is_empty());
        match (group, artifact, version) {
            (Some(group), Some(artifact), Some(version)) => {
                Ok(Self::new(group, artifact, version))
            }
            _ => Err(anyhow::anyhow!(
                "Invalid project key: {value} (expected group:artifact:version)"
            )),
        }
    }
}

impl Serialize for ProjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
