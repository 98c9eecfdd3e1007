//! Configuration management for Showreel
//!
//! This module handles loading and managing application configuration
//! from config files and environment variables.

use crate::content::MediaSource;
use crate::player::PlayerConfig;
use crate::utils::error::{IntoShowreelError, Result, ShowreelError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport player configuration
    pub player: PlayerConfig,

    /// Hover-preview tiles
    pub preview: PreviewConfig,

    /// Content source configuration
    pub content: ContentConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Hover-preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Loop preview clips while hovered
    pub loop_clips: bool,

    /// Keep preview clips muted
    pub muted: bool,
}

/// Content source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// JSON catalog to read sources from
    pub catalog_path: Option<PathBuf>,

    /// Source used when the catalog has nothing for a player
    pub placeholder: MediaSource,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            loop_clips: true,
            muted: true,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            placeholder: MediaSource::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/showreel/config.toml on Linux)
    /// 3. User config file (~/.config/showreel/config.toml on Linux)
    /// 4. Environment variables (SHOWREEL_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Read a single TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| ShowreelError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(delay) = std::env::var("SHOWREEL_CONTROLS_HIDE_DELAY_MS") {
            self.player.controls_hide_delay_ms = delay.parse()
                .map_err(|_| ShowreelError::Config("Invalid SHOWREEL_CONTROLS_HIDE_DELAY_MS".to_string()))?;
        }

        if let Ok(timeout) = std::env::var("SHOWREEL_STALL_TIMEOUT_MS") {
            self.player.stall_timeout_ms = timeout.parse()
                .map_err(|_| ShowreelError::Config("Invalid SHOWREEL_STALL_TIMEOUT_MS".to_string()))?;
        }

        if let Ok(volume) = std::env::var("SHOWREEL_DEFAULT_VOLUME") {
            self.player.default_volume = volume.parse()
                .map_err(|_| ShowreelError::Config("Invalid SHOWREEL_DEFAULT_VOLUME".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("SHOWREEL_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        if let Ok(catalog) = std::env::var("SHOWREEL_CATALOG") {
            self.content.catalog_path = Some(PathBuf::from(catalog));
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.default_volume) {
            return Err(ShowreelError::Config("Default volume must be between 0.0 and 1.0".to_string()));
        }

        if self.player.controls_hide_delay_ms == 0 {
            return Err(ShowreelError::Config("Controls hide delay must be non-zero".to_string()));
        }

        if !(self.preview.muted && self.preview.loop_clips) {
            return Err(ShowreelError::Config("Preview clips must stay muted and looping".to_string()));
        }

        if !self.content.placeholder.is_playable() {
            return Err(ShowreelError::Config("Placeholder source needs a media URL".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(ShowreelError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level,
                valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/showreel/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA").ok()
            .map(|p| PathBuf::from(p).join("Showreel").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/Showreel/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("showreel").join("config.toml"))
    }
}
