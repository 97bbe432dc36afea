//! Application configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ForgeError, Result};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Interpreter used when neither the options file nor the CLI names one
    pub default_python: Option<String>,
    /// Execution configuration
    pub execution: ExecutionConfig,
    /// UI configuration
    pub ui: UiConfig,
}

/// Execution-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Time between a stop request and a forced kill
    pub grace_period_ms: u64,
    /// Warn before a run when Nuitka cannot be detected
    pub probe_before_run: bool,
}

/// UI-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable TUI by default
    pub enable_tui: bool,
    /// Log level
    pub log_level: String,
    /// Redraw and progress tick interval
    pub tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_python: None,
            execution: ExecutionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 2000,
            probe_before_run: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enable_tui: true,
            log_level: "info".to_string(),
            tick_ms: 250,
        }
    }
}

impl ExecutionConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl AppConfig {
    /// `<config dir>/nuitka-forge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Loads the config at `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ForgeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Loads from the explicit path if given, else from the default location
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }
}
