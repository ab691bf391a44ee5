//! Error types for Comet

use thiserror::Error;

/// The main error type for Comet operations
#[derive(Debug, Error)]
pub enum CometError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl CometError {
    /// Shorthand for a [`CometError::Configuration`] with a formatted message
    pub fn config(msg: impl Into<String>) -> Self {
        CometError::Configuration(msg.into())
    }
}

/// Result type alias for Comet operations
pub type Result<T> = std::result::Result<T, CometError>;

impl From<toml::de::Error> for CometError {
    fn from(err: toml::de::Error) -> Self {
        CometError::TomlParseError(err.to_string())
    }
}
