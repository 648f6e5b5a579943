//! Dnevnik - session-scoped school diary API proxy
//!
//! Main entry point for the Dnevnik CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

use commands::{config, serve, token};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Dnevnik - session-scoped school diary API proxy
#[derive(Parser)]
#[command(name = "dnevnik")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to load instead of discovering one
    #[arg(long, global = true, env = "DNEVNIK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the proxy server
    Serve(serve::ServeArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Mint a session token for local testing
    Token(token::TokenArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = commands::Context {
        verbose: cli.verbose,
        config_path: cli.config,
    };

    // Logging settings come from config; a broken config is reported by the
    // command itself, so fall back to defaults here.
    let logging = commands::discover(ctx.config_path.as_deref())
        .map(|loaded| loaded.config.logging())
        .unwrap_or_default();
    let _guard = logging::init(cli.verbose, &logging);

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Token(args) => token::run(args, &ctx).await,
    }
}
