#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use devforge::cli::{Cli, Commands};
use devforge::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(cmd) => {
            commands::init::execute(cmd)?;
        }
        Commands::Generate {
            config,
            output,
            dry_run,
        } => {
            commands::generate::execute(config, output.as_deref(), *dry_run)?;
        }
        Commands::Validate { config } => {
            commands::validate::execute(config)?;
        }
        Commands::ListTemplates => {
            commands::list::templates()?;
        }
        Commands::ListPresets => {
            commands::list::presets()?;
        }
    }

    Ok(())
}
