use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// `path` relative to `base`. Both are canonicalized when the plain prefix
/// does not match, so `./tree` and `/abs/tree` compare equal.
pub fn get_relative_path(base: &Path, path: &Path) -> Result<PathBuf> {
    if let Ok(relative) = path.strip_prefix(base) {
        return Ok(relative.to_path_buf());
    }
    let base = base
        .canonicalize()
        .context(format!("Failed to resolve base path - {}", base.display()))?;
    let path = path
        .canonicalize()
        .context(format!("Failed to resolve path - {}", path.display()))?;
    path.strip_prefix(&base)
        .map(Path::to_path_buf)
        .map_err(|_| anyhow::anyhow!("{} is not inside {}", path.display(), base.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_get_relative_path_plain_prefix() {
        let result = get_relative_path(Path::new("/tree"), Path::new("/tree/a/pom.xml")).unwrap();
        assert_eq!(result, PathBuf::from("a/pom.xml"));
    }

    #[test]
    fn test_get_relative_path_same_dir() {
        let result = get_relative_path(Path::new("/tree"), Path::new("/tree")).unwrap();
        assert_eq!(result, PathBuf::new());
    }

    #[test]
    fn test_get_relative_path_canonicalized() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let base = temp_dir.path().join("a").join("..");
        let result = get_relative_path(&base, &nested).unwrap();
        assert_eq!(result, PathBuf::from("a/b"));
        temp_dir.close().unwrap();
    }

    #[test]
    fn test_get_relative_path_outside_base() {
        let temp_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let result = get_relative_path(temp_dir.path(), outside_dir.path());
        assert!(result.is_err());
        temp_dir.close().unwrap();
        outside_dir.close().unwrap();
    }
}
