//! Utility module for Showreel
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Time label formatting for the transport display

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, ContentConfig, GeneralConfig, PreviewConfig};
pub use error::{ShowreelError, Result};

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Format a media time in seconds for display
///
/// Unknown or negative values render as zero. Output is "HH:MM:SS" for an
/// hour or more and "MM:SS" otherwise; fractions of a second are truncated.
pub fn format_timestamp(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
