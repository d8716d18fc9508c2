//! Configuration management
//!
//! Configuration is stored as TOML in `<config dir>/drb/config.toml`. The
//! directory can be overridden with the `DRB_CONFIG_DIR` environment variable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::Token;
use crate::error::{Error, Result};
use crate::option::{OptionId, Options};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "DRB_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Current configuration file format
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Application key and secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<Token>,

    /// Access token of the authorized user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,

    #[serde(default)]
    pub defaults: DefaultOptions,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            app: None,
            token: None,
            defaults: DefaultOptions::default(),
        }
    }
}

/// Client defaults applied to every call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOptions {
    /// `dropbox`, `sandbox` or `auto`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Seconds; 0 or absent means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_timeout: Option<u64>,
}

impl DefaultOptions {
    /// Option list suitable for `Client::set_default`
    ///
    /// Unset entries map to [`crate::Value::Ignore`], clearing any previous default.
    pub fn to_options(&self) -> Options {
        Options::new()
            .with(OptionId::Root, self.root.as_deref())
            .with(OptionId::Locale, self.locale.as_deref())
            .with(OptionId::NetworkTimeout, self.network_timeout)
    }
}

/// Loads and saves the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default location
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Cannot determine config directory".into()))?
                .join("drb"),
        };

        Ok(Self {
            config_path: dir.join(CONFIG_FILE),
        })
    }

    /// Create a manager for an explicit file, used by tests
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, returning the default one when no file exists
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse {}: {e}",
                self.config_path.display()
            ))
        })?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Unsupported config schema version {} (expected at most {SCHEMA_VERSION})",
                config.schema_version
            )));
        }

        Ok(config)
    }

    /// Write the configuration, creating the directory if needed
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        let tmp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.config_path)?;

        tracing::debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }
}
