//! CLI command handlers.

pub mod config;
pub mod serve;
pub mod token;

use std::path::{Path, PathBuf};

use dnevnik_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load the effective config, reporting warnings on stderr.
    pub fn load_config(&self) -> anyhow::Result<LoadedConfig> {
        let loaded = discover(self.config_path.as_deref())?;

        for warning in &loaded.warnings {
            eprintln!("warning: {}", warning);
        }

        if self.verbose {
            let files = loaded.loaded_from();
            if files.is_empty() {
                eprintln!("No config files found, using defaults + CLI args");
            }
            for file in files {
                eprintln!("Loaded config: {}", file.display());
            }
        }

        Ok(loaded)
    }
}

/// Load an explicit config file, or discover the user and project layers.
pub fn discover(path: Option<&Path>) -> dnevnik_config::Result<LoadedConfig> {
    match path {
        Some(path) => dnevnik_config::load_config_from(path),
        None => dnevnik_config::load_config(None),
    }
}
