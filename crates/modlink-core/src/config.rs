//! Loader configuration.
//!
//! Configuration is read from a TOML file and from environment variables:
//!
//! ```toml
//! search_paths = ["/opt/app/lib"]
//!
//! [aliases]
//! m = ["libm.so.6", "libm.dylib"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// Environment variable names.
pub mod env_vars {
    /// Extra library search directories, separated like `PATH`.
    pub const LIBRARY_PATH: &str = "MODLINK_LIBRARY_PATH";
    /// Path to the configuration file.
    pub const CONFIG: &str = "MODLINK_CONFIG";
    /// Emit JSON logs from the CLI when set to `true`.
    pub const LOG_JSON: &str = "MODLINK_LOG_JSON";
}

/// File name of the per-user configuration file.
pub const CONFIG_FILE_NAME: &str = "modlink.toml";

/// Settings for [`LibraryResolver`](crate::LibraryResolver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directories tried, in order, before the platform search path.
    pub search_paths: Vec<PathBuf>,

    /// Alternate names to try for a library, keyed by the requested name.
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl LoaderConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search directory.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set the alternate names for a library.
    pub fn with_alias<I, S>(mut self, name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(name.into(), candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LoaderError::Config(e.to_string()))
    }

    /// Read configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoaderError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            LoaderError::Config(msg) => LoaderError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Build configuration from environment variables.
    pub fn from_env() -> Self {
        let search_paths = std::env::var_os(env_vars::LIBRARY_PATH)
            .map(|v| {
                std::env::split_paths(&v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            search_paths,
            aliases: BTreeMap::new(),
        }
    }

    /// Combine two configurations.
    ///
    /// Search paths from `other` are appended; its aliases replace ours
    /// key by key.
    pub fn merge(mut self, other: LoaderConfig) -> Self {
        for path in other.search_paths {
            if !self.search_paths.contains(&path) {
                self.search_paths.push(path);
            }
        }
        self.aliases.extend(other.aliases);
        self
    }

    /// Load the effective configuration.
    ///
    /// Uses `path` if given, otherwise `MODLINK_CONFIG`, otherwise the
    /// per-user config file if it exists. Environment settings are merged
    /// on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(env_vars::CONFIG).map(PathBuf::from))
            .or_else(|| default_config_path().filter(|p| p.is_file()));

        let base = match file {
            Some(file) => {
                tracing::debug!("Reading loader configuration from {}", file.display());
                Self::from_file(&file)?
            }
            None => Self::default(),
        };

        Ok(base.merge(Self::from_env()))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LoaderError::Config(e.to_string()))
    }
}

/// Per-user configuration file location, e.g. `~/.config/modlink/modlink.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("modlink").join(CONFIG_FILE_NAME))
}
