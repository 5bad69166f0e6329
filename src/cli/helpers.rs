//! Shared helper functions for CLI commands
//!
//! Configuration, store and logging setup used by several command modules,
//! plus small formatting helpers.

use miette::Result;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::GlobalOpts;
use crate::core::config::{Config, ConfigError};
use crate::core::directory::ReferenceDirectory;
use crate::core::logging;
use crate::core::store::{Store, StoreError};

/// Turn a configuration error into a report, keeping YAML source spans
pub fn config_report(err: ConfigError) -> miette::Report {
    match err {
        ConfigError::Yaml(yaml) => miette::Report::new(yaml),
        other => miette::miette!("{}", other),
    }
}

pub fn store_report(err: StoreError) -> miette::Report {
    miette::miette!("{}", err)
}

/// Load the configuration selected by the global options
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::discover(global.config.as_deref()).map_err(config_report)
}

/// Open the configured database
pub fn open_store(config: &Config) -> Result<Store> {
    let path = config.database_path().map_err(config_report)?;
    Store::open(&path, config.numbering.first_job_number).map_err(|e| {
        miette::miette!(
            help = "run `jobflow init` or set database.path",
            "Cannot open database {}: {}",
            path.display(),
            e
        )
    })
}

/// Load the reference directory, pointing at `directory import` when defaults are missing
pub fn load_directory(store: &Store, config: &Config) -> Result<ReferenceDirectory> {
    store.load_directory(&config.defaults).map_err(|e| match e {
        StoreError::Directory(dir) => miette::miette!(
            help = "import reference data with `jobflow directory import`",
            "{}",
            dir
        ),
        other => store_report(other),
    })
}

/// Install logging for this run
///
/// A broken configuration must not prevent the command from reporting it, so
/// logging falls back to defaults when the file cannot be loaded.
pub fn init_logging(global: &GlobalOpts) -> Option<WorkerGuard> {
    let config = Config::discover(global.config.as_deref()).unwrap_or_default();
    let level = logging::effective_level(&config.logging.level, global.verbose, global.quiet);
    let log_dir = config.log_directory();
    if let Some(dir) = &log_dir {
        if std::fs::create_dir_all(dir).is_err() {
            return logging::init(&level, None);
        }
    }
    logging::init(&level, log_dir.as_deref())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Display an optional value, `-` when absent
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("SAW")), "SAW");
    }

    #[test]
    fn test_config_report_keeps_message() {
        let report = config_report(ConfigError::Invalid("bad width".to_string()));
        assert!(report.to_string().contains("bad width"));
    }
}
