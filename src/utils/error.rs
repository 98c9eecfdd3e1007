//! Error types for Showreel
//!
//! This module defines the error type used by the fallible edges of the
//! crate: configuration loading, catalog fetching, and mounting a player on
//! a media handle. Transport commands never return these; they report
//! ignored requests through `CommandOutcome` instead.

use thiserror::Error;

/// Main error type for Showreel
#[derive(Error, Debug)]
pub enum ShowreelError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Malformed JSON or TOML input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Content catalog errors
    #[error("Content error: {0}")]
    Content(String),

    /// The media handle refused a command or a listener binding
    #[error("Media handle error: {0}")]
    Handle(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for ShowreelError {
    fn from(err: serde_json::Error) -> Self {
        ShowreelError::Parse(format!("JSON: {}", err))
    }
}

impl ShowreelError {
    /// Create a media handle error from string
    pub fn handle_error<S: Into<String>>(msg: S) -> Self {
        ShowreelError::Handle(msg.into())
    }
}

/// Convenience type alias for Results in Showreel
pub type Result<T> = std::result::Result<T, ShowreelError>;

/// Extension trait for converting other errors to ShowreelError
pub trait IntoShowreelError<T> {
    /// Convert this error into a ShowreelError with the given context
    fn config_err(self, context: &str) -> Result<T>;
    fn content_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoShowreelError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| ShowreelError::Config(format!("{}: {}", context, e)))
    }

    fn content_err(self, context: &str) -> Result<T> {
        self.map_err(|e| ShowreelError::Content(format!("{}: {}", context, e)))
    }
}
