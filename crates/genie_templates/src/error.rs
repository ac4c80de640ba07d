//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

use genie_model::ModelError;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Coarse classification of a [`TemplateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    TemplateNotFound,
    GrammarNotFound,
    MalformedBlock,
    Io,
}

/// Errors that can occur while expanding and emitting templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found for class {class}: {path}{hint}")]
    TemplateNotFound {
        class: String,
        path: PathBuf,
        /// Available templates, pre-formatted for the message.
        hint: String,
    },

    #[error("Grammar file not found for class {class}: {path}")]
    GrammarNotFound { class: String, path: PathBuf },

    #[error("Invalid grammar file {path}: expected an object of strings or sections of strings: {source}")]
    InvalidGrammar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read license file {path}: {source}")]
    License {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed block in template {template} for class {class}: {tag} has no closing marker")]
    MalformedBlock {
        class: String,
        template: String,
        tag: String,
    },

    #[error("Validation error: unresolved tag {tag} in template {template} for class {class}")]
    UnresolvedTag {
        class: String,
        template: String,
        tag: String,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::TemplateNotFound { .. } => ErrorKind::TemplateNotFound,
            TemplateError::GrammarNotFound { .. } => ErrorKind::GrammarNotFound,
            TemplateError::InvalidGrammar { .. } | TemplateError::License { .. } => {
                ErrorKind::Configuration
            }
            TemplateError::MalformedBlock { .. } => ErrorKind::MalformedBlock,
            TemplateError::UnresolvedTag { .. } => ErrorKind::Validation,
            TemplateError::Write { .. } | TemplateError::Io(_) => ErrorKind::Io,
            TemplateError::Model(e) if e.is_validation() => ErrorKind::Validation,
            TemplateError::Model(_) => ErrorKind::Configuration,
        }
    }
}
