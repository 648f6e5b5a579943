//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets redacted)
    Show,

    /// Show the user configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;

    println!("# Sources (lowest precedence first):");
    for source in &loaded.sources {
        let status = if source.loaded { "loaded" } else { "not found" };
        println!("#   {} ({})", source.path.display(), status);
    }
    println!();
    print!("{}", loaded.config.redacted().to_toml()?);

    Ok(())
}

fn cmd_path() -> Result<()> {
    match dnevnik_config::xdg_config_path() {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("could not determine the user config directory"),
    }
    Ok(())
}
