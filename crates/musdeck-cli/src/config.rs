//! TOML configuration for the musdeck binary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the browser opens into at startup.
    #[serde(default = "default_music_root")]
    pub music_root: PathBuf,
    /// Listing rows per page.
    #[serde(default = "default_page_rows")]
    pub page_rows: usize,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_root: default_music_root(),
            page_rows: default_page_rows(),
            log_file: default_log_file(),
        }
    }
}

fn default_music_root() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_page_rows() -> usize {
    28
}

fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("musdeck")
        .join("musdeck.log")
}

impl Config {
    /// Load the config, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("musdeck")
            .join("config.toml")
    }
}
