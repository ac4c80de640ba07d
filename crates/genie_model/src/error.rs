//! Error types for the metadata model.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or decoding a project.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid configuration in {path}: {message}")]
    Configuration { path: PathBuf, message: String },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML parsing error: {0}")]
    Xml(String),
}

impl ModelError {
    /// Whether this error came from a rule violation rather than undecodable input.
    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ModelError::Validation(message.into())
    }
}

impl From<quick_xml::Error> for ModelError {
    fn from(e: quick_xml::Error) -> Self {
        ModelError::Xml(e.to_string())
    }
}
