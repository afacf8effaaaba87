use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use vman_core::{DescriptorCodec, ReadOptions, Session, VersionMap, VersionMapBuilder};

/// Builds the session's version map from `boms`, at most once per session.
///
/// BOMs are read strictly and applied in order, so a later BOM overrides an
/// earlier one. A BOM that fails to parse is recorded against its path and
/// skipped. Conflicting entries are recorded as errors only when the session
/// asks for strict BOM conflicts.
pub async fn build_version_map(
    session: &Session,
    codec: &dyn DescriptorCodec,
    boms: &[PathBuf],
) -> Arc<VersionMap> {
    if let Some(map) = session.version_map() {
        debug!("Version map already built ({} entries)", map.len());
        return map;
    }

    let mut builder = VersionMapBuilder::new();
    for bom in boms {
        let descriptor = match codec.read(bom, ReadOptions::STRICT).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!("{e}");
                session.add_error(bom, e);
                continue;
            }
        };

        let conflicts = builder.add_bom(&descriptor);
        session.log(
            bom,
            format!(
                "Mapped {} managed versions from BOM: {}",
                descriptor.managed_dependencies().len(),
                bom.display()
            ),
        );
        for conflict in conflicts {
            if session.strict_bom_conflicts() {
                warn!("{conflict}");
                session.add_error(bom, conflict);
            } else {
                debug!("{conflict}");
            }
        }
    }

    let map = session.set_version_map(builder.build());
    info!("Version map ready: {} entries from {} BOMs", map.len(), map.by_bom().len());
    map
}
