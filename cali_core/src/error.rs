//! Error types for the cali_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cali_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport error talking to the remote planner
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The compiled-in progression template is inconsistent
    #[error("Template validation error: {0}")]
    TemplateValidation(String),

    /// Catalogue validation error
    #[error("Catalogue validation error: {0}")]
    CatalogueValidation(String),

    /// A mutation referenced a step that is not in the tree
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// The remote planner answered with something we can't use
    #[error("Planner error: {0}")]
    Planner(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
