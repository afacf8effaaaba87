//! # vman-core
//!
//! Core model and session state for BOM-driven version management.
//!
//! Defines build coordinates and descriptors, the frozen version map built from BOMs,
//! the ancestry graph over loaded projects, and the run-scoped [`Session`] every
//! component records its logs, errors and missing-version bookkeeping into.
//! Descriptor file formats plug in through the [`DescriptorCodec`] trait.

pub mod activity_log;
pub mod ancestry_graph;
pub mod config;
pub mod coordinate;
pub mod descriptor;
pub mod descriptor_codec;
pub mod error;
pub mod missing_info;
pub mod session;
pub mod session_report;
pub mod version_map;

// Re-export for convenience
pub use activity_log::ActivityLog;
pub use ancestry_graph::{AncestryGraph, ParentLink};
pub use config::Config;
pub use coordinate::{Coordinate, DEFAULT_DEPENDENCY_TYPE, POM_TYPE, ProjectKey, VersionlessKey};
pub use descriptor::{DependencyDeclaration, Descriptor, parent_coordinate};
pub use descriptor_codec::{DescriptorCodec, ReadOptions};
pub use error::VmanError;
pub use missing_info::MissingInfo;
pub use session::{Session, SessionOptions};
pub use session_report::SessionReport;
pub use version_map::{VersionMap, VersionMapBuilder};
