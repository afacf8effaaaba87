use colored::Colorize;
use vman_core::SessionReport;

use crate::ModifySummary;

/// Human-readable run summary for the terminal.
pub fn display_summary(summary: &ModifySummary, report: &SessionReport) -> String {
    let mut lines = vec![format!(
        "{} {} {} {}",
        format!("[{} loaded]", summary.loaded).bright_blue().bold(),
        format!("{} changed", summary.changed).bright_green(),
        format!("{} unchanged", summary.unchanged).bright_white(),
        if summary.failed > 0 {
            format!("{} failed", summary.failed).bright_red().bold()
        } else {
            format!("{} failed", summary.failed).bright_black()
        },
    )];

    for path in &summary.written {
        lines.push(format!("  {} {}", "→".bright_cyan(), path.display()));
    }

    if !report.missing.missing_versions().is_empty() {
        lines.push(format!(
            "{}",
            format!(
                "Keys missing from the BOMs: {}",
                report.missing.missing_versions().len()
            )
            .yellow()
        ));
        for key in report.missing.missing_versions().keys() {
            lines.push(format!("  {}", key.to_string().bright_black()));
        }
    }

    if let Some(toolchain) = &report.toolchain
        && !report.outside_toolchain.is_empty()
    {
        lines.push(format!(
            "{}",
            format!(
                "Projects not descending from {toolchain}: {}",
                report.outside_toolchain.len()
            )
            .yellow()
        ));
        for key in &report.outside_toolchain {
            lines.push(format!("  {}", key.to_string().bright_black()));
        }
    }

    for (path, errors) in &report.errors {
        for error in errors {
            lines.push(format!(
                "{} {}: {}",
                "error".bright_red().bold(),
                path.display(),
                error
            ));
        }
    }

    lines.join("\n")
}
