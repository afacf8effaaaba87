//! Error kinds recorded against descriptor files.
//!
//! None of these escape normal per-file processing: they are collected on the
//! session and surfaced through reports. The single exception is a parse
//! failure of an explicitly requested root descriptor, which aborts a load.

use std::path::PathBuf;

use crate::coordinate::{ProjectKey, VersionlessKey};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmanError {
    /// Descriptor could not be read or parsed
    #[error("Cannot build model from descriptor: {path}. Reason: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Parent reference without an explicit version
    #[error("INVALID descriptor: Missing parent version in {path}")]
    MissingParentVersion { path: PathBuf },

    /// Backup directory creation or copy failed
    #[error("Error making backup of descriptor: {path}. Target: {target}. Reason: {reason}")]
    Backup {
        path: PathBuf,
        target: PathBuf,
        reason: String,
    },

    /// Serialization or output I/O failed
    #[error("Failed to write modified descriptor to: {target}. Reason: {reason}")]
    Write { target: PathBuf, reason: String },

    /// Parent edge would close a cycle in the ancestry graph
    #[error("Ancestry cycle detected: {parent} cannot be a parent of {child}")]
    AncestryCycle { parent: ProjectKey, child: ProjectKey },

    /// Two BOMs approve different versions of the same key
    #[error("BOM conflict for {key}: {previous} replaced by {current}")]
    BomConflict {
        key: VersionlessKey,
        previous: String,
        current: String,
    },
}

impl VmanError {
    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error stops processing of the file it is recorded against.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::BomConflict { .. })
    }
}
