use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Loaded from `.vman/config.json`, supplies the defaults every CLI flag can override.
///
/// BOM paths, the workspace location and the rewrite switches can all be pinned
/// here so a tree is normalized the same way on every run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// BOM descriptor paths providing approved versions, in processing order
    #[serde(default)]
    pub boms: Vec<PathBuf>,

    /// Parent of the backups/downloads/reports directories (default: ".vman")
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Report output directory (default: "<workspace>/reports")
    #[serde(default)]
    pub reports: Option<PathBuf>,

    /// Glob pattern used to discover descriptors when a directory is given
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Follow module declarations when loading descriptors
    #[serde(default)]
    pub recursive: bool,

    /// Keep descriptors in their directory instead of relocating into a
    /// directory named after the new version
    #[serde(default)]
    pub preserve_dirs: bool,

    /// Appended to the approved version of each rewritten project and parent
    #[serde(default)]
    pub version_suffix: Option<String>,

    /// `group:artifact:version` of the approved toolchain ancestor
    #[serde(default)]
    pub toolchain: Option<String>,

    /// Relocated artifacts.
    /// Key: `group:artifact` of the old artifact
    /// Value: `group:artifact:version` it moved to
    #[serde(default)]
    pub relocations: HashMap<String, String>,

    /// Record conflicting BOM entries as errors (last BOM still wins)
    #[serde(default)]
    pub strict_bom_conflicts: bool,
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".vman")
}

fn default_pattern() -> String {
    "**/pom.xml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boms: Vec::new(),
            workspace: default_workspace(),
            reports: None,
            pattern: default_pattern(),
            recursive: false,
            preserve_dirs: false,
            version_suffix: None,
            toolchain: None,
            relocations: HashMap::new(),
            strict_bom_conflicts: false,
        }
    }
}

impl Config {
    /// Resolved reports directory.
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.reports
            .clone()
            .unwrap_or_else(|| self.workspace.join("reports"))
    }
}
