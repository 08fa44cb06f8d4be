//! Configuration management for the CLI

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use headroom_lib::Attribution;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration stored in `~/.config/headroom/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<OutputFormat>,
    /// Default attribution source
    pub attribution: Option<Attribution>,
    /// Kubeconfig used when `--kubeconfig` is not given
    pub kubeconfig: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        serde_json::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("headroom").join("config.json"))
    }
}

/// Kubeconfig to load explicitly; `None` falls back to `KUBECONFIG`,
/// `~/.kube/config` or the in-cluster service account
pub fn kubeconfig_path(override_path: Option<&Path>, config: &Config) -> Option<PathBuf> {
    override_path
        .map(Path::to_path_buf)
        .or_else(|| config.kubeconfig.clone())
}
