use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{create_dir_all, write};
use tracing::info;
use vman_core::{Session, SessionReport};

pub const REPORT_FILE: &str = "vman-report.json";
pub const ACTIVITY_LOG_FILE: &str = "activity.log";

fn render_activity_log(report: &SessionReport) -> String {
    let mut out = String::new();
    for (path, log) in &report.logs {
        let _ = writeln!(out, "{}:", path.display());
        for message in log.messages() {
            for line in message.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        if let Some(errors) = report.errors.get(path) {
            for error in errors {
                let _ = writeln!(out, "  ERROR: {error}");
            }
        }
        out.push('\n');
    }
    out
}

/// Writes the JSON report and the plain-text activity log into `reports_dir`.
///
/// # Errors
/// Returns error if the directory or either file cannot be written.
pub async fn write_reports(reports_dir: &Path, session: &Session) -> Result<Vec<PathBuf>> {
    create_dir_all(reports_dir)
        .await
        .context(format!("Failed to create reports directory - {}", reports_dir.display()))?;

    let report = session.report();
    let report_file = reports_dir.join(REPORT_FILE);
    let activity_file = reports_dir.join(ACTIVITY_LOG_FILE);
    let json = serde_json::to_string_pretty(&report)?;
    let activity = render_activity_log(&report);

    futures::future::try_join(write(&report_file, json), write(&activity_file, activity))
        .await
        .context(format!("Failed to write reports - {}", reports_dir.display()))?;

    info!("Reports written to {}", reports_dir.display());
    Ok(vec![report_file, activity_file])
}
