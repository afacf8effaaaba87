use std::path::{Path, PathBuf};

use tokio::fs::{canonicalize, copy, create_dir_all, remove_file, rename, write};
use tracing::{error, info, warn};
use vman_core::{Descriptor, DescriptorCodec, Session, VmanError};

use crate::get_relative_path;

async fn resolve_dir(dir: &Path) -> PathBuf {
    match canonicalize(dir).await {
        Ok(canonical) => canonical,
        Err(_) => std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()),
    }
}

/// Moves `dir` to a sibling named `version`. Keeps `dir` if the move fails.
async fn relocate_dir(dir: &Path, version: &str, session: &Session, original: &Path) -> PathBuf {
    if dir.file_name().is_some_and(|name| name == version) {
        return dir.to_path_buf();
    }
    let dir = resolve_dir(dir).await;
    let target = match dir.parent() {
        Some(parent) => parent.join(version),
        None => PathBuf::from(version),
    };
    match rename(&dir, &target).await {
        Ok(()) => {
            session.log(
                original,
                format!("Moved {} to {}", dir.display(), target.display()),
            );
            target
        }
        Err(e) => {
            warn!("Failed to move {} to {}: {e}", dir.display(), target.display());
            session.log(
                original,
                format!("NOT moving {} to {}: {e}", dir.display(), target.display()),
            );
            dir
        }
    }
}

async fn write_atomic(target: &Path, content: &str) -> std::io::Result<()> {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{file_name}.vman-tmp"));
    if let Err(e) = write(&temp, content).await {
        let _ = remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = rename(&temp, target).await {
        let _ = remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

/// Persists a rewritten descriptor.
///
/// The output is `<dir>/<artifact>-<version>.<ext>`, where `version` is the
/// descriptor's own version or else its parent's. Unless `preserve_dirs` is
/// set, the descriptor's directory is first moved to a sibling named after
/// that version. A backup of the original is mirrored under the session's
/// backups directory, relative to `base_dir`, before anything is written.
/// The original file is deleted when the output lands elsewhere.
///
/// Failures are recorded against the descriptor's path and yield `None`.
pub async fn commit_descriptor(
    descriptor: &Descriptor,
    base_dir: &Path,
    session: &Session,
    codec: &dyn DescriptorCodec,
    preserve_dirs: bool,
) -> Option<PathBuf> {
    let original = descriptor.path();
    let fail = |error: VmanError| {
        error!("{error}");
        session.add_error(original, error);
        None
    };

    let Some(version) = descriptor.effective_version() else {
        return fail(VmanError::Write {
            target: original.to_path_buf(),
            reason: "Descriptor has no version and no parent version".to_string(),
        });
    };
    let file_name = original.file_name().map(PathBuf::from).unwrap_or_default();
    let source_dir = original
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let out_dir = if preserve_dirs {
        source_dir.to_path_buf()
    } else {
        relocate_dir(source_dir, version, session, original).await
    };
    let current = out_dir.join(&file_name);

    let relative_dir = get_relative_path(base_dir, source_dir).unwrap_or_default();
    let backup_dir = session.backups().join(relative_dir);
    let backup = backup_dir.join(&file_name);
    session.log(original, format!("Writing backup: {}", backup.display()));
    let backed_up = match create_dir_all(&backup_dir).await {
        Ok(()) => copy(&current, &backup).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = backed_up {
        return fail(VmanError::Backup {
            path: original.to_path_buf(),
            target: backup,
            reason: e.to_string(),
        });
    }

    let out = out_dir.join(format!(
        "{}-{version}.{}",
        descriptor.coordinate().artifact(),
        codec.output_extension()
    ));
    let content = match codec.write(descriptor) {
        Ok(content) => content,
        Err(e) => return fail(e),
    };
    session.log(original, format!("Writing modified POM: {}", out.display()));
    if let Err(e) = write_atomic(&out, &content).await {
        return fail(VmanError::Write {
            target: out,
            reason: e.to_string(),
        });
    }

    if out != current {
        session.log(original, format!("Deleting original POM: {}", current.display()));
        if let Err(e) = remove_file(&current).await {
            warn!("Failed to delete {}: {e}", current.display());
        }
    }

    info!("Wrote {}", out.display());
    Some(out)
}
