use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vman_core::{Config, ProjectKey, Session, SessionOptions};
use vman_pom::PomCodec;
use vman_utils::{
    ModifyRequest, Targets, display_summary, get_vman_config, modify_versions, write_reports,
};

use crate::options::FormatOptions;

#[derive(Args, Debug)]
#[command(about = "Rewrite descriptor versions to match the BOMs")]
pub struct ModifyArgs {
    /// Descriptor files to rewrite. When none are given, --dir is scanned
    targets: Vec<PathBuf>,

    /// BOM descriptor providing approved versions (repeatable, later wins)
    #[arg(short, long = "bom")]
    boms: Vec<PathBuf>,

    /// Directory to scan for descriptors (default: current directory)
    #[arg(short, long, conflicts_with = "targets")]
    dir: Option<PathBuf>,

    /// Glob pattern matched below --dir
    #[arg(short, long)]
    pattern: Option<String>,

    /// Directory holding backups, downloads and reports
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    #[arg(long)]
    reports: Option<PathBuf>,

    /// Follow module declarations
    #[arg(short, long)]
    recursive: bool,

    /// Keep descriptors in their directories
    #[arg(long)]
    preserve_dirs: bool,

    /// Appended to rewritten project and parent versions
    #[arg(long, allow_hyphen_values = true)]
    suffix: Option<String>,

    /// `group:artifact:version` of the toolchain ancestor
    #[arg(long)]
    toolchain: Option<String>,

    /// Record conflicting BOM entries as errors
    #[arg(long)]
    strict_bom_conflicts: bool,

    #[arg(long, default_value = "stdout")]
    format: FormatOptions,
}

impl ModifyArgs {
    /// Flags override the configuration file; switches can only turn options on.
    fn apply(&self, mut config: Config) -> Config {
        if !self.boms.is_empty() {
            config.boms.clone_from(&self.boms);
        }
        if let Some(workspace) = &self.workspace {
            config.workspace.clone_from(workspace);
        }
        if let Some(reports) = &self.reports {
            config.reports = Some(reports.clone());
        }
        if let Some(pattern) = &self.pattern {
            config.pattern.clone_from(pattern);
        }
        if let Some(suffix) = &self.suffix {
            config.version_suffix = Some(suffix.clone());
        }
        if let Some(toolchain) = &self.toolchain {
            config.toolchain = Some(toolchain.clone());
        }
        config.recursive |= self.recursive;
        config.preserve_dirs |= self.preserve_dirs;
        config.strict_bom_conflicts |= self.strict_bom_conflicts;
        config
    }
}

/// Rewrite descriptor versions
///
/// # Errors
/// Returns error if no BOM is configured, the configuration is invalid, or a
/// target descriptor cannot be parsed.
pub async fn handle_modify(args: &ModifyArgs) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let config = args.apply(get_vman_config(&current_dir).await?);
    if config.boms.is_empty() {
        anyhow::bail!("No BOM given. Pass --bom or set \"boms\" in .vman/config.json");
    }

    let session = Session::create(SessionOptions::from_config(&config)?).await?;
    for (from, to) in &config.relocations {
        let target: ProjectKey = to
            .parse()
            .context(format!("Invalid relocation target for {from}"))?;
        session.add_relocation(from.clone(), target);
    }

    let targets = if args.targets.is_empty() {
        Targets::Scan {
            dir: args.dir.clone().unwrap_or(current_dir),
            pattern: config.pattern.clone(),
        }
    } else {
        Targets::Files(args.targets.clone())
    };
    let request = ModifyRequest {
        boms: config.boms.clone(),
        targets,
    };

    let summary = modify_versions(&session, &PomCodec, &request).await?;
    write_reports(session.reports(), &session).await?;

    let report = session.report();
    let output = args.format.render(
        || display_summary(&summary, &report),
        &serde_json::json!({
            "summary": summary,
            "report": report,
        }),
    )?;
    println!("{output}");
    Ok(())
}
