use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{Pattern, glob};
use tracing::{debug, warn};

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Descriptor files under `dir` matching `pattern`, sorted.
///
/// Paths with a `.`-prefixed component below `dir` (VCS metadata, the default
/// workspace) and anything inside `workspace` are skipped.
pub fn find_descriptors(dir: &Path, pattern: &str, workspace: &Path) -> Result<Vec<PathBuf>> {
    let full_pattern = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        pattern.trim_start_matches("./")
    );
    let workspace = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());

    let mut found = Vec::new();
    for entry in glob(&full_pattern).context(format!("Invalid descriptor pattern - {pattern}"))? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable path during scan: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        if is_hidden(relative) {
            debug!("Skipping hidden path {}", path.display());
            continue;
        }
        if path
            .canonicalize()
            .is_ok_and(|canonical| canonical.starts_with(&workspace))
        {
            debug!("Skipping workspace path {}", path.display());
            continue;
        }
        found.push(path);
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<project/>").unwrap();
    }

    #[test]
    fn test_find_descriptors_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "pom.xml");
        touch(root, "web/pom.xml");
        touch(root, "core/pom.xml");
        touch(root, ".git/pom.xml");
        touch(root, "core/.hidden/pom.xml");
        touch(root, "work/backups/pom.xml");
        touch(root, "core/readme.txt");

        let found = find_descriptors(root, "**/pom.xml", &root.join("work")).unwrap();
        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("core/pom.xml"),
                PathBuf::from("pom.xml"),
                PathBuf::from("web/pom.xml"),
            ]
        );
        temp_dir.close().unwrap();
    }

    #[test]
    fn test_find_descriptors_custom_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "a/pom.xml");
        touch(root, "a/app-1.0.pom");

        let found = find_descriptors(root, "**/*.pom", &root.join(".vman")).unwrap();
        assert_eq!(found, vec![root.join("a/app-1.0.pom")]);
        temp_dir.close().unwrap();
    }

    #[test]
    fn test_find_descriptors_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_descriptors(temp_dir.path(), "***[", Path::new(".vman"));
        assert!(result.is_err());
        temp_dir.close().unwrap();
    }
}
