use anyhow::Result;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{ConfigArgs, ModifyArgs, handle_config, handle_modify};
pub mod commands;
pub mod options;

#[derive(Parser, Debug)]
#[command(
    name = "vman",
    author,
    version,
    about = "Rewrite build descriptor versions to match a bill of materials",
    help_template = "{name} {version}\n{about}\n\n{usage-heading} {usage}\n\n{all-args}"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Modify(ModifyArgs),
    Config(ConfigArgs),
}

// stdout carries the summary/JSON; logs go to stderr
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vman=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn main(args: &[String]) -> Result<()> {
    let cli = Cli::parse_from(args);
    init_tracing();
    match cli.command {
        Commands::Modify(args) => handle_modify(&args).await?,
        Commands::Config(args) => handle_config(&args).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_modify() {
        let cli = Cli::parse_from(["vman", "modify", "--bom", "bom.xml"]);
        assert!(matches!(cli.command, Commands::Modify(_)));
    }

    #[test]
    fn test_cli_parsing_config() {
        let cli = Cli::parse_from(["vman", "config"]);
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["vman"]).is_err());
    }
}
