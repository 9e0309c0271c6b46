//! Configuration file resolution and loading
//!
//! Each service reads an optional TOML file. The file location is resolved in
//! priority order:
//! 1. Explicit path (command-line argument)
//! 2. `WDSP_CONFIG` environment variable
//! 3. Per-user config directory: `<config_dir>/wdsp/<module>.toml`
//! 4. System-wide `/etc/wdsp/<module>.toml` (Linux only)
//!
//! A service with no config file anywhere starts on compiled defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WDSP_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging section shared by all service config files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Reject levels `tracing` does not know about
    pub fn validate(&self) -> Result<()> {
        let level = self.level.trim().to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Unknown log level '{}' (expected one of: {})",
                self.level,
                LOG_LEVELS.join(", ")
            )))
        }
    }
}

/// Locates the TOML config file for one service module
#[derive(Debug, Clone)]
pub struct ConfigFileResolver {
    module_name: String,
}

impl ConfigFileResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// File name for this module (`<module>.toml`)
    pub fn file_name(&self) -> String {
        format!("{}.toml", self.module_name)
    }

    /// Resolve the config file path
    ///
    /// Explicit and environment paths are returned as given, existing or not,
    /// so that a typo surfaces as an error at load time. Discovered paths are
    /// only returned when the file exists.
    pub fn resolve(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        if let Some(path) = self.user_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        if cfg!(target_os = "linux") {
            let system = PathBuf::from("/etc/wdsp").join(self.file_name());
            if system.exists() {
                return Some(system);
            }
        }

        None
    }

    /// Per-user config location, whether or not it exists
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wdsp").join(self.file_name()))
    }
}

/// Load a TOML config file into `T`
///
/// `None` means no file was found: `T::default()` is returned with a warning.
/// A path that does not exist or does not parse is a configuration error.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        warn!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}
