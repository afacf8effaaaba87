use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use vman_core::{Config, Session, SessionOptions};
use vman_utils::get_vman_config;

use crate::options::FormatOptions;

#[derive(Args, Debug)]
#[command(about = "Show the effective vman configuration and the directories it resolves to")]
pub struct ConfigArgs {
    #[arg(long, default_value = "stdout")]
    format: FormatOptions,
}

/// Directories a run with this configuration reads and writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedPaths {
    workspace: PathBuf,
    backups: PathBuf,
    downloads: PathBuf,
    reports: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView {
    config: Config,
    resolved: ResolvedPaths,
}

impl ConfigView {
    fn new(config: Config) -> Result<Self> {
        // validates the toolchain key the same way a run would
        let session = Session::new(SessionOptions::from_config(&config)?);
        let resolved = ResolvedPaths {
            workspace: session.workspace().to_path_buf(),
            backups: session.backups().to_path_buf(),
            downloads: session.downloads().to_path_buf(),
            reports: session.reports().to_path_buf(),
        };
        Ok(Self { config, resolved })
    }

    fn display(&self) -> String {
        let config = &self.config;
        let boms = if config.boms.is_empty() {
            "(none)".bright_black().to_string()
        } else {
            config
                .boms
                .iter()
                .map(|bom| bom.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut lines = vec![
            format!("{} {boms}", "BOMs:".bright_blue().bold()),
            format!("{} {}", "Pattern:".bright_blue().bold(), config.pattern),
            format!("{} {}", "Recursive:".bright_blue().bold(), config.recursive),
            format!("{} {}", "Preserve dirs:".bright_blue().bold(), config.preserve_dirs),
        ];
        if let Some(suffix) = &config.version_suffix {
            lines.push(format!("{} {suffix}", "Version suffix:".bright_blue().bold()));
        }
        if let Some(toolchain) = &config.toolchain {
            lines.push(format!("{} {toolchain}", "Toolchain:".bright_blue().bold()));
        }
        let mut relocations: Vec<_> = config.relocations.iter().collect();
        relocations.sort();
        for (from, to) in relocations {
            lines.push(format!("{} {from} → {to}", "Relocation:".bright_blue().bold()));
        }
        for (label, path) in [
            ("Workspace:", &self.resolved.workspace),
            ("Backups:", &self.resolved.backups),
            ("Downloads:", &self.resolved.downloads),
            ("Reports:", &self.resolved.reports),
        ] {
            lines.push(format!("{} {}", label.bright_cyan(), path.display()));
        }
        lines.join("\n")
    }
}

/// Display the vman configuration
///
/// # Errors
/// Returns error if reading the configuration fails or it names an invalid
/// toolchain.
pub async fn handle_config(args: &ConfigArgs) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let view = ConfigView::new(get_vman_config(&current_dir).await?)?;
    println!("{}", args.format.render(|| view.display(), &view)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_config_args_parsing() {
        let cli = TestCli::parse_from(["test"]);
        assert!(matches!(cli.config.format, FormatOptions::Stdout));
        let cli = TestCli::parse_from(["test", "--format", "json"]);
        assert!(matches!(cli.config.format, FormatOptions::Json));
    }

    #[test]
    fn test_config_view_resolves_directories() {
        colored::control::set_override(false);
        let config = Config {
            boms: vec![PathBuf::from("bom.xml")],
            workspace: PathBuf::from("ws"),
            reports: Some(PathBuf::from("out")),
            toolchain: Some("org.tools:toolchain:1".to_string()),
            ..Config::default()
        };
        let view = ConfigView::new(config).unwrap();
        assert_eq!(view.resolved.backups, PathBuf::from("ws/backups"));
        assert_eq!(view.resolved.reports, PathBuf::from("out"));

        let output = view.display();
        assert!(output.contains("BOMs: bom.xml"));
        assert!(output.contains("Toolchain: org.tools:toolchain:1"));
        assert!(output.contains("Downloads: ws/downloads"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["config"]["workspace"], "ws");
        assert_eq!(json["resolved"]["downloads"], "ws/downloads");
        colored::control::unset_override();
    }

    #[test]
    fn test_config_view_rejects_invalid_toolchain() {
        let config = Config {
            toolchain: Some("not-a-key".to_string()),
            ..Config::default()
        };
        assert!(ConfigView::new(config).is_err());
    }
}
