use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tokio::fs::canonicalize;
use tracing::{debug, error, info};
use vman_core::{Descriptor, DescriptorCodec, Session, VmanError};

use crate::{
    build_version_map, commit_descriptor, find_descriptors, load_descriptors, rewrite_descriptor,
};

/// Descriptors a run operates on.
#[derive(Debug, Clone)]
pub enum Targets {
    /// Explicit descriptor files; each is written next to itself. Backups
    /// mirror the tree below the deepest directory holding every loaded file.
    Files(Vec<PathBuf>),
    /// Every file under `dir` matching the glob `pattern`.
    Scan { dir: PathBuf, pattern: String },
}

#[derive(Debug, Clone)]
pub struct ModifyRequest {
    pub boms: Vec<PathBuf>,
    pub targets: Targets,
}

/// Outcome counts of one [`modify_versions`] run.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifySummary {
    pub loaded: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub written: Vec<PathBuf>,
}

/// Deepest directory containing every descriptor in `descriptors`.
async fn common_base(descriptors: &[Descriptor]) -> PathBuf {
    let mut base: Option<PathBuf> = None;
    for descriptor in descriptors {
        let dir = descriptor
            .path()
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let dir = match canonicalize(dir).await {
            Ok(canonical) => canonical,
            Err(_) => std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()),
        };
        base = Some(match base {
            None => dir,
            Some(base) => base
                .ancestors()
                .find(|ancestor| dir.starts_with(ancestor))
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        });
    }
    base.unwrap_or_default()
}

/// Rewrites every target descriptor onto the versions approved by the BOMs.
///
/// Per-file failures are recorded on the session and do not stop the run.
///
/// # Errors
/// Returns error if the scan pattern is invalid or a target descriptor
/// cannot be parsed.
pub async fn modify_versions(
    session: &Session,
    codec: &dyn DescriptorCodec,
    request: &ModifyRequest,
) -> Result<ModifySummary> {
    let map = build_version_map(session, codec, &request.boms).await;

    let roots = match &request.targets {
        Targets::Files(files) => files.clone(),
        Targets::Scan { dir, pattern } => find_descriptors(dir, pattern, session.workspace())?,
    };
    let descriptors = load_descriptors(session, codec, &roots).await?;
    session.add_projects(&descriptors);

    let (base_dir, preserve_dirs) = match &request.targets {
        Targets::Files(_) => (common_base(&descriptors).await, true),
        Targets::Scan { dir, .. } => (dir.clone(), session.preserve_dirs()),
    };
    debug!("Backups mirror descriptors relative to {}", base_dir.display());

    let mut summary = ModifySummary {
        loaded: descriptors.len(),
        ..ModifySummary::default()
    };
    for mut descriptor in descriptors {
        let path = descriptor.path().to_path_buf();
        if session.errors_for(&path).iter().any(VmanError::is_fatal) {
            summary.failed += 1;
            continue;
        }

        match rewrite_descriptor(&mut descriptor, &map, session) {
            Ok(true) => {
                match commit_descriptor(&descriptor, &base_dir, session, codec, preserve_dirs).await {
                    Some(out) => {
                        summary.changed += 1;
                        summary.written.push(out);
                    }
                    None => summary.failed += 1,
                }
            }
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                error!("{e}");
                session.add_error(&path, e);
                summary.failed += 1;
            }
        }
    }

    match &request.targets {
        Targets::Files(files) => info!(
            "Modified descriptor versions. Targets: {}, BOMs: {}, Backups: {}",
            files.len(),
            request.boms.len(),
            session.backups().display()
        ),
        Targets::Scan { dir, .. } => info!(
            "Modified descriptor versions in directory. Directory: {}, BOMs: {}, Backups: {}",
            dir.display(),
            request.boms.len(),
            session.backups().display()
        ),
    }
    Ok(summary)
}
