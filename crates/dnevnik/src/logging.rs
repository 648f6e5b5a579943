//! Tracing setup: human-readable console output plus a rotating JSON file.

use std::path::PathBuf;

use dnevnik_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Console filter used with `--verbose`.
const VERBOSE_FILTER: &str = "dnevnik=debug,dnevnik_server=debug,dnevnik_upstream=debug,dnevnik_cache=debug,dnevnik_config=debug,info";

/// The log file records everything from our crates.
const FILE_FILTER: &str = "dnevnik=trace,dnevnik_server=trace,dnevnik_upstream=trace,dnevnik_cache=trace,dnevnik_config=trace,info";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must outlive the
/// command.
pub fn init(verbose: bool, config: &LoggingConfig) -> Option<WorkerGuard> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(verbose, &config.level));

    let (file, guard) = match file_appender(config) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

/// `-v` wins, then `RUST_LOG`, then the configured level.
fn console_filter(verbose: bool, level: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn log_dir(config: &LoggingConfig) -> PathBuf {
    config.directory.clone().unwrap_or_else(|| {
        dnevnik_config::xdg_config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    })
}

fn file_appender(config: &LoggingConfig) -> Option<RollingFileAppender> {
    if !config.json_file {
        return None;
    }

    let dir = log_dir(config);
    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("dnevnik")
        .filename_suffix("log")
        .build(&dir)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("warning: file logging disabled ({}): {}", dir.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_directory_wins() {
        let config = LoggingConfig {
            directory: Some(PathBuf::from("/var/log/dnevnik")),
            ..Default::default()
        };
        assert_eq!(log_dir(&config), PathBuf::from("/var/log/dnevnik"));
    }

    #[test]
    fn test_file_logging_can_be_disabled() {
        let config = LoggingConfig {
            json_file: false,
            ..Default::default()
        };
        assert!(file_appender(&config).is_none());
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().join("logs")),
            ..Default::default()
        };
        assert!(file_appender(&config).is_some());
        assert!(dir.path().join("logs").is_dir());
    }
}
