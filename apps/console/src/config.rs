//! # Console Configuration
//!
//! Loaded once at startup, read-only afterwards.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`WARUNG_*`)
//! 2. Config file (`console.toml` in the platform config dir)
//! 3. Defaults (this file)
//!
//! ```toml
//! store_name = "Warung Bu Sri"
//! merchant_phone = "+62 812-3456-7890"
//! low_stock_threshold = 3
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warung_core::validation::validate_phone;
use warung_core::DEFAULT_LOW_STOCK_THRESHOLD;

/// Config file name inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "console.toml";

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Shown in the storefront greeting and the order message
    pub store_name: String,

    /// Merchant messaging contact for storefront orders
    pub merchant_phone: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Where the storefront cart is persisted between sessions
    pub cart_path: PathBuf,

    /// Products with stock below this show up in the low-stock report
    pub low_stock_threshold: i64,
}

impl Default for ConsoleConfig {
    /// Development defaults: files under the platform data dir, or the
    /// working directory when no home directory can be determined.
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        ConsoleConfig {
            store_name: "Warung".to_string(),
            merchant_phone: "6281200000000".to_string(),
            database_path: data_dir.join("warung.db"),
            cart_path: data_dir.join("cart.json"),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ConsoleConfig {
    /// Loads defaults, then `console.toml` from the platform config dir
    /// (if present), then `WARUNG_*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let file = project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));
        let mut config = match file {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => ConsoleConfig::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Reading config file");
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `WARUNG_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `WARUNG_STORE_NAME`
    /// - `WARUNG_MERCHANT_PHONE`
    /// - `WARUNG_DB_PATH`
    /// - `WARUNG_CART_PATH`
    /// - `WARUNG_LOW_STOCK_THRESHOLD`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WARUNG_STORE_NAME") {
            self.store_name = v;
        }
        if let Some(v) = lookup("WARUNG_MERCHANT_PHONE") {
            self.merchant_phone = v;
        }
        if let Some(v) = lookup("WARUNG_DB_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARUNG_CART_PATH") {
            self.cart_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARUNG_LOW_STOCK_THRESHOLD") {
            self.low_stock_threshold = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WARUNG_LOW_STOCK_THRESHOLD".to_string()))?;
        }
        Ok(())
    }

    /// Rejects values the commands cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("store_name".to_string()));
        }
        validate_phone(&self.merchant_phone)
            .map_err(|_| ConfigError::InvalidValue("merchant_phone".to_string()))?;
        if self.low_stock_threshold < 0 {
            return Err(ConfigError::InvalidValue("low_stock_threshold".to_string()));
        }
        Ok(())
    }

    /// Creates the parent directories of the database and cart files.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for path in [&self.database_path, &self.cart_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("id", "warung", "pos")
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot parse config file: {0}")]
    Parse(String),

    #[error("Cannot access {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}
