//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use argmine_pipeline::PipelineConfig;
use argmine_scoring::ScorerConfig;
use argmine_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// ```toml
/// database = "/home/me/.argmine/argmine.db"
///
/// [pipeline]
/// min_component_score = 0.5
/// override = false
///
/// [scorer]
/// component_url = "http://localhost:8080/components"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path
    #[serde(default = "default_database")]
    pub database: String,

    /// Pipeline thresholds and switches
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Model-serving endpoints
    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(home()?.join(".argmine").join("config.toml"))
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.pipeline.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file is created with default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Open the configured store, creating parent directories as needed.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = Path::new(&self.database);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(SqliteStore::new(path)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            pipeline: PipelineConfig::default(),
            scorer: ScorerConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))
}

fn default_database() -> String {
    home()
        .map(|home| home.join(".argmine").join("argmine.db"))
        .unwrap_or_else(|_| PathBuf::from("argmine.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
