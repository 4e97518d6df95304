//! Error types for MoSh

use thiserror::Error;

/// The main error type for MoSh operations
#[derive(Debug, Error)]
pub enum MoshError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Could not match animation to a body model: {0}")]
    ModelMismatch(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Load error: {0}")]
    LoadError(String),
}

/// Result type alias for MoSh operations
pub type Result<T> = std::result::Result<T, MoshError>;

impl From<toml::de::Error> for MoshError {
    fn from(err: toml::de::Error) -> Self {
        MoshError::TomlParseError(err.to_string())
    }
}
