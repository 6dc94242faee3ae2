//! TrackPlan CLI
//!
//! Usage:
//!   trackplan [OPTIONS] <COMMAND>
//!
//! Commands:
//!   check    Load a layout file and verify its connections and groups
//!   upgrade  Bring a layout file up to the current format version
//!   info     Print a summary of a layout file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use trackplan::cli::{check_file, summarize_file, upgrade_file};
use trackplan::{init_logging, Config};

#[derive(Parser)]
#[command(name = "trackplan")]
#[command(about = "Layout planner for brick-built track systems", version)]
struct Cli {
    /// Configuration file (TOML or JSON); defaults to the platform config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a layout file and verify its connections and groups
    Check {
        file: PathBuf,
    },
    /// Bring a layout file up to the current format version
    Upgrade {
        file: PathBuf,
        /// Write the upgraded layout here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a layout file
    Info {
        file: PathBuf,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(&path)?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_config(cli.config).context("Failed to load configuration")?;
    let catalog = Arc::new(config.load_catalog().context("Failed to load piece catalog")?);

    match cli.command {
        Command::Check { file } => {
            let layout = check_file(&file, catalog)?;
            println!(
                "{}: ok ({} pieces, {} groups, {} layers)",
                file.display(),
                layout.piece_count(),
                layout.group_count(),
                layout.layers().len()
            );
        }
        Command::Upgrade { file, output } => {
            if upgrade_file(&file, output.as_deref(), &catalog)? {
                println!("{}: upgraded", file.display());
            } else {
                println!("{}: already current", file.display());
            }
        }
        Command::Info { file } => {
            print!("{}", summarize_file(&file, catalog)?);
        }
    }

    Ok(())
}
