//! Application configuration.
//!
//! Covers the service base URL, the label catalog, the log level, and an
//! optional font for label text. The catalog defaults to the citizen-card
//! labels; overriding it in a config file changes the wire contract for
//! every label file written afterwards, so reorderings need a migration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{default_catalog, Label, LabelCatalog};

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur while loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
}

impl LogLevel {
    /// Convert to the log crate's `LevelFilter`.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// Application configuration, serializable to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Base URL of the sample persistence service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Label catalog; ordering is the class-index wire contract
    #[serde(default = "default_labels")]
    pub labels: Vec<Label>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional TTF/OTF font for rendering label names
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_labels() -> Vec<Label> {
    default_catalog().iter().cloned().collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            base_url: default_base_url(),
            labels: default_labels(),
            log_level: LogLevel::default(),
            font_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// The label catalog this configuration defines.
    pub fn catalog(&self) -> LabelCatalog {
        LabelCatalog::new(self.labels.clone())
    }
}
