//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "rigcheck.yaml";

pub const ENV_CATALOG: &str = "RIGCHECK_CATALOG";
pub const ENV_ESTIMATES: &str = "RIGCHECK_ESTIMATES";
pub const ENV_FORMAT: &str = "RIGCHECK_FORMAT";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {}", path.display())]
    #[diagnostic(code(rigcheck::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {message}", path.display())]
    #[diagnostic(
        code(rigcheck::config::parse),
        help("Expected YAML keys: catalog_dir, estimates_file, default_format, default_use_case")
    )]
    Parse { path: PathBuf, message: String },
}

/// rigcheck configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the per-category part catalogs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,

    /// Estimate catalog file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimates_file: Option<PathBuf>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Use-case tag applied when `--use-case` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_use_case: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// A config file that cannot be read or parsed is reported and skipped.
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/rigcheck/config.yaml)
        // 3. Working directory config (./rigcheck.yaml)
        let files = [Self::global_config_path(), Some(PathBuf::from(LOCAL_CONFIG_FILE))];
        for path in files.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "loaded config layer");
                    config.merge(layer);
                }
                Err(e) => warn!("{}", e),
            }
        }

        // 4. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    /// Read one config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Config layer taken from environment variables
    fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        Config {
            catalog_dir: set(ENV_CATALOG).map(PathBuf::from),
            estimates_file: set(ENV_ESTIMATES).map(PathBuf::from),
            default_format: set(ENV_FORMAT),
            default_use_case: None,
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rigcheck")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.catalog_dir.is_some() {
            self.catalog_dir = other.catalog_dir;
        }
        if other.estimates_file.is_some() {
            self.estimates_file = other.estimates_file;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.default_use_case.is_some() {
            self.default_use_case = other.default_use_case;
        }
    }
}
