use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs::{canonicalize, metadata};
use tracing::{debug, warn};
use vman_core::{Descriptor, DescriptorCodec, ReadOptions, Session};

async fn identity(path: &Path) -> PathBuf {
    match canonicalize(path).await {
        Ok(canonical) => canonical,
        Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Module declaration resolved to a descriptor file, if it exists.
async fn resolve_module(dir: &Path, module: &str, codec: &dyn DescriptorCodec) -> Option<PathBuf> {
    let target = dir.join(module);
    let target = match metadata(&target).await {
        Ok(meta) if meta.is_dir() => target.join(codec.descriptor_file_name()),
        Ok(_) => return Some(target),
        Err(_) => return None,
    };
    metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_file())
        .then_some(target)
}

/// Loads `roots` and, when the session is recursive, every module they
/// declare, breadth first.
///
/// Each file is loaded once, identified by its canonical path. Descriptors are
/// read leniently. A root that fails to parse aborts the load; a module that
/// fails is recorded against its path and skipped.
pub async fn load_descriptors(
    session: &Session,
    codec: &dyn DescriptorCodec,
    roots: &[PathBuf],
) -> Result<Vec<Descriptor>> {
    let mut queue: VecDeque<(PathBuf, bool)> = roots.iter().map(|root| (root.clone(), true)).collect();
    let mut visited = HashSet::new();
    let mut descriptors = Vec::new();

    while let Some((path, is_root)) = queue.pop_front() {
        if !visited.insert(identity(&path).await) {
            debug!("Already loaded: {}", path.display());
            continue;
        }

        let descriptor = match codec.read(&path, ReadOptions::LENIENT).await {
            Ok(descriptor) => descriptor,
            Err(e) if is_root => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to load descriptor - {}", path.display())));
            }
            Err(e) => {
                warn!("Skipping module: {e}");
                session.add_error(&path, e);
                continue;
            }
        };

        if session.recursive() {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            for module in descriptor.modules() {
                match resolve_module(dir, module, codec).await {
                    Some(target) => queue.push_back((target, false)),
                    None => debug!("Module {module} of {} not found", path.display()),
                }
            }
        }
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vman_core::{SessionOptions, VmanError};
    use vman_pom::PomCodec;

    fn write_pom(path: &Path, artifact: &str, modules: &[&str]) {
        let modules: String = modules
            .iter()
            .map(|m| format!("    <module>{m}</module>\n"))
            .collect();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!(
                "<project>\n  <groupId>g</groupId>\n  <artifactId>{artifact}</artifactId>\n  <version>1.0</version>\n  <modules>\n{modules}  </modules>\n</project>\n"
            ),
        )
        .unwrap();
    }

    fn session(root: &Path, recursive: bool) -> Session {
        let mut options = SessionOptions::new(root.join(".vman"));
        options.recursive = recursive;
        Session::new(options)
    }

    #[tokio::test]
    async fn test_load_descriptors_recursive_dedupes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("pom.xml"), "parent", &["child", "child/pom.xml"]);
        write_pom(&root.join("child/pom.xml"), "child", &[]);

        let descriptors = load_descriptors(&session(root, true), &PomCodec, &[root.join("pom.xml")])
            .await
            .unwrap();

        let artifacts: Vec<_> = descriptors
            .iter()
            .map(|d| d.coordinate().artifact().to_string())
            .collect();
        assert_eq!(artifacts, vec!["parent", "child"]);
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_shared_module_of_two_parents() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("a/pom.xml"), "a", &["../shared"]);
        write_pom(&root.join("b/pom.xml"), "b", &["../shared"]);
        write_pom(&root.join("shared/pom.xml"), "shared", &[]);

        let descriptors = load_descriptors(
            &session(root, true),
            &PomCodec,
            &[root.join("a/pom.xml"), root.join("b/pom.xml")],
        )
        .await
        .unwrap();

        let artifacts: Vec<_> = descriptors
            .iter()
            .map(|d| d.coordinate().artifact().to_string())
            .collect();
        assert_eq!(artifacts, vec!["a", "b", "shared"]);
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("pom.xml"), "parent", &["child"]);
        write_pom(&root.join("child/pom.xml"), "child", &[]);

        let descriptors = load_descriptors(&session(root, false), &PomCodec, &[root.join("pom.xml")])
            .await
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_missing_module_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("pom.xml"), "parent", &["gone", "empty-dir"]);
        fs::create_dir_all(root.join("empty-dir")).unwrap();

        let session = session(root, true);
        let descriptors = load_descriptors(&session, &PomCodec, &[root.join("pom.xml")])
            .await
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(session.error_count(), 0);
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_broken_module_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("pom.xml"), "parent", &["broken"]);
        fs::create_dir_all(root.join("broken")).unwrap();
        fs::write(root.join("broken/pom.xml"), "<project><groupId>g</groupId></project>").unwrap();

        let session = session(root, true);
        let descriptors = load_descriptors(&session, &PomCodec, &[root.join("pom.xml")])
            .await
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        assert!(matches!(
            session.errors_for(&root.join("broken/pom.xml")).as_slice(),
            [VmanError::Parse { .. }]
        ));
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_broken_root_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("pom.xml"), "not xml at all <").unwrap();

        let result = load_descriptors(&session(root, true), &PomCodec, &[root.join("pom.xml")]).await;
        assert!(result.is_err());
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_load_descriptors_duplicate_roots() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pom(&root.join("pom.xml"), "parent", &[]);

        let descriptors = load_descriptors(
            &session(root, false),
            &PomCodec,
            &[root.join("pom.xml"), root.join("./pom.xml")],
        )
        .await
        .unwrap();
        assert_eq!(descriptors.len(), 1);
        temp_dir.close().unwrap();
    }
}
