use std::path::Path;

use tracing::debug;
use vman_core::{DependencyDeclaration, Descriptor, Session, VersionMap, VersionlessKey, VmanError};

fn relocation_note(session: &Session, key: &VersionlessKey) -> String {
    session
        .relocation(key)
        .map(|target| format!(" Relocated to: {target}."))
        .unwrap_or_default()
}

fn record_missing(session: &Session, path: &Path, key: &VersionlessKey) {
    session.add_missing_version(path, key.clone());
    session.log(
        path,
        format!(
            "POM version is missing in BOM: {key}{}",
            relocation_note(session, key)
        ),
    );
}

fn rewrite_own_version(descriptor: &mut Descriptor, map: &VersionMap, session: &Session) -> bool {
    let path = descriptor.path().to_path_buf();
    let Some(current) = descriptor.coordinate().version().map(str::to_string) else {
        return false;
    };
    let key = descriptor.coordinate().pom_key();
    let Some(approved) = map.get(&key).map(|version| session.suffixed_version(version)) else {
        record_missing(session, &path, &key);
        return false;
    };

    if approved == current {
        session.log(&path, format!("POM version is already in line with BOM: {current}"));
        return false;
    }
    session.log(&path, format!("Changing POM version from: {current} to: {approved}"));
    descriptor.coordinate_mut().set_version(approved);
    true
}

fn rewrite_parent_version(
    descriptor: &mut Descriptor,
    map: &VersionMap,
    session: &Session,
) -> Result<bool, VmanError> {
    let path = descriptor.path().to_path_buf();
    let Some(parent) = descriptor.parent_mut() else {
        return Ok(false);
    };
    let key = parent.pom_key();
    let Some(current) = parent.version().map(str::to_string) else {
        session.log(&path, "INVALID POM: Missing parent version.");
        return Err(VmanError::MissingParentVersion { path });
    };
    let Some(approved) = map.get(&key).map(|version| session.suffixed_version(version)) else {
        record_missing(session, &path, &key);
        return Ok(false);
    };

    if approved == current {
        session.log(&path, format!("POM parent ({key}) version is correct: {current}"));
        return Ok(false);
    }
    session.log(
        &path,
        format!("Changing POM parent ({key}) version\n\tFrom: {current}\n\tTo: {approved}"),
    );
    parent.set_version(approved);
    Ok(true)
}

fn rewrite_dependency(
    declaration: &mut DependencyDeclaration,
    map: &VersionMap,
    session: &Session,
    path: &Path,
) -> bool {
    let key = declaration.coordinate().versionless_key();
    let managed = if declaration.is_managed() { " [MANAGED]" } else { "" };

    let Some(current) = declaration.version().map(str::to_string) else {
        session.log(
            path,
            format!("NOT changing version for: {key}{managed}. Version is inherited."),
        );
        return false;
    };
    let Some(approved) = map.get(&key) else {
        debug!("{key} is not managed by any BOM ({})", path.display());
        session.add_missing_version(path, key.clone());
        session.add_missing_dependency(declaration.coordinate());
        session.log(
            path,
            format!(
                "Version for: {key}{managed} is missing in BOM.{}",
                relocation_note(session, &key)
            ),
        );
        return false;
    };

    if approved == current {
        session.log(path, format!("Version for: {key}{managed} is already correct."));
        return false;
    }
    session.log(
        path,
        format!("Changing version for: {key}{managed}.\n\tFrom: {current}\n\tTo: {approved}."),
    );
    declaration.set_version(approved);
    true
}

/// Applies the version map to one descriptor in memory.
///
/// Rewrites the descriptor's own version, its parent reference, then its
/// dependencies and managed dependencies. Declarations without a version are
/// inherited and left alone. Keys absent from the map are recorded as
/// missing. Plugins are never rewritten; the ones the map does not know are
/// recorded as unmanaged.
///
/// Returns whether anything changed.
///
/// # Errors
/// Returns [`VmanError::MissingParentVersion`] if the parent reference has no
/// version; the descriptor must not be written in that case.
pub fn rewrite_descriptor(
    descriptor: &mut Descriptor,
    map: &VersionMap,
    session: &Session,
) -> Result<bool, VmanError> {
    let path = descriptor.path().to_path_buf();

    let mut changed = rewrite_own_version(descriptor, map, session);
    changed |= rewrite_parent_version(descriptor, map, session)?;
    for declaration in descriptor.dependencies_mut() {
        changed |= rewrite_dependency(declaration, map, session, &path);
    }
    for declaration in descriptor.managed_dependencies_mut() {
        changed |= rewrite_dependency(declaration, map, session, &path);
    }

    for plugin in descriptor.plugins() {
        if !map.contains(&plugin.versionless_key()) && session.add_unmanaged_plugin(&path, plugin) {
            debug!("Unmanaged plugin {plugin} in {}", path.display());
        }
    }

    Ok(changed)
}
