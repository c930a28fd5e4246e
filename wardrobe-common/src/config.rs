//! Configuration file location and loading
//!
//! Every Wardrobe service reads an optional TOML bootstrap file. The file is
//! located in the following priority order:
//! 1. `WARDROBE_CONFIG` environment variable (explicit file path)
//! 2. User config directory: `~/.config/wardrobe/<module>.toml`
//! 3. System config directory: `/etc/wardrobe/<module>.toml` (Linux only)
//!
//! A missing file is never fatal: services log a warning and fall back to
//! compiled defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WARDROBE_CONFIG";

/// Logging configuration shared by all services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates the TOML config file for one service module
#[derive(Debug, Clone)]
pub struct ConfigFileLocator {
    module_name: String,
}

impl ConfigFileLocator {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Candidate paths, highest priority first
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        let file_name = format!("{}.toml", self.module_name);

        if let Some(explicit) = env_non_empty(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(explicit));
        }

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("wardrobe").join(&file_name));
        }

        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc/wardrobe").join(&file_name));
        }

        paths
    }

    /// First candidate that exists on disk
    pub fn locate(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|p| p.is_file())
    }
}

/// Load a TOML config file, or defaults when no file is given
///
/// A file that exists but fails to parse is an error: silently ignoring a
/// typo in credentials would be worse than refusing to start.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        warn!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Read an environment variable, treating empty or whitespace-only values as unset
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| is_non_blank(value))
}

/// Non-empty, non-whitespace check for keys and credentials
pub fn is_non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}
