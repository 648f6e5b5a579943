//! Configuration system for the Dnevnik proxy.
//!
//! Provides TOML-based configuration with:
//! - Sections for the HTTP server, the upstream API, the response cache,
//!   session authentication and logging
//! - Config file layering (user config dir + project-local overrides)
//! - Session secret resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_from, load_config_with_options,
    save_config, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SESSION_SECRET_ENV, SecretSource, resolve_session_secret};
pub use types::*;
