mod build_version_map;
mod commit_descriptor;
mod display_summary;
mod find_descriptors;
mod get_relative_path;
mod get_vman_config;
mod load_descriptors;
mod modify_versions;
mod rewrite_descriptor;
mod write_reports;

pub use build_version_map::build_version_map;
pub use commit_descriptor::commit_descriptor;
pub use display_summary::display_summary;
pub use find_descriptors::find_descriptors;
pub use get_relative_path::get_relative_path;
pub use get_vman_config::get_vman_config;
pub use load_descriptors::load_descriptors;
pub use modify_versions::{ModifyRequest, ModifySummary, Targets, modify_versions};
pub use rewrite_descriptor::rewrite_descriptor;
pub use write_reports::{ACTIVITY_LOG_FILE, REPORT_FILE, write_reports};
