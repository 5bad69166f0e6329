//! Connector configuration loaded from `jobflow.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::flatten::FlattenOptions;
use crate::core::routing::RoutingMap;
use crate::yaml::{parse_yaml_file, YamlError};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "jobflow.yaml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Cannot determine a data directory; set 'database.path'")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connector behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// When false, `process` and `watch` refuse to run
    pub active: bool,
    pub erp_user: Option<String>,
    pub sales_code: Option<String>,
    pub import_operations: bool,
    pub import_material: bool,
    pub default_location: Option<String>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            active: true,
            erp_user: None,
            sales_code: None,
            import_operations: true,
            import_material: false,
            default_location: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// Job numbering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingConfig {
    /// Width of the ERP job number column
    pub job_number_width: usize,
    /// First top-level job number of a fresh database
    pub first_job_number: u64,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            job_number_width: 10,
            first_job_number: 1,
        }
    }
}

/// Designated fallback resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub work_center: String,
    pub vendor: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            work_center: "GENERAL".to_string(),
            vendor: "MISC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rotated log file
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connector: ConnectorConfig,
    pub database: DatabaseConfig,
    pub numbering: NumberingConfig,
    pub defaults: DefaultsConfig,
    pub routing: RoutingMap,
    pub logging: LoggingConfig,

    /// File this configuration was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let mut config: Config = parse_yaml_file(path)?;
        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `jobflow.yaml` in the working directory,
    /// else built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }
        Ok(Self::default())
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.numbering.job_number_width == 0 {
            return Err(ConfigError::Invalid(
                "numbering.job_number_width must be at least 1".to_string(),
            ));
        }
        if self.numbering.first_job_number.to_string().len() > self.numbering.job_number_width {
            return Err(ConfigError::Invalid(format!(
                "numbering.first_job_number {} does not fit in {} characters",
                self.numbering.first_job_number, self.numbering.job_number_width
            )));
        }
        if self.defaults.work_center.trim().is_empty() {
            return Err(ConfigError::Invalid("defaults.work_center is blank".to_string()));
        }
        if self.defaults.vendor.trim().is_empty() {
            return Err(ConfigError::Invalid("defaults.vendor is blank".to_string()));
        }
        for (name, targets) in &self.routing.inside {
            if targets.iter().any(|t| t.work_center.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "routing.inside.{}: work_center is blank",
                    name
                )));
            }
        }
        for (name, targets) in &self.routing.outside {
            if targets.iter().any(|t| t.vendor.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "routing.outside.{}: vendor is blank",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            job_number_width: self.numbering.job_number_width,
            import_operations: self.connector.import_operations,
        }
    }

    /// Configured database path, or `jobflow.db` in the platform data directory
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(self.relative_to_source(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "jobflow").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("jobflow.db"))
    }

    /// Log directory, resolved against the config file location
    pub fn log_directory(&self) -> Option<PathBuf> {
        self.logging
            .directory
            .as_ref()
            .map(|dir| self.relative_to_source(dir))
    }

    fn relative_to_source(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.source.as_ref().and_then(|s| s.parent()) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Template written by `jobflow init`
pub const TEMPLATE: &str = r#"# jobflow configuration

connector:
  active: true
  # erp_user: CONNECTOR
  # sales_code: WEB
  import_operations: true
  import_material: false

database:
  path: jobflow.db

numbering:
  # width of the ERP job number column
  job_number_width: 10
  first_job_number: 1

# used when a referenced work center or vendor does not exist
defaults:
  work_center: GENERAL
  vendor: MISC

# quoted operation name -> ERP resources, in routing order
routing:
  inside:
    Saw:
      - work_center: SAW
  outside:
    Anodize:
      - vendor: PLATECO
        service: ANODIZE

logging:
  level: info
  # directory: logs
"#;
