//! CLI error types

use rwe_capability::CapabilityError;
use rwe_engine::EngineError;
use rwe_store::StoreError;
use rwe_types::ConfigError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine or offline pass failure
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Model service client could not be built
    #[error("Model service error: {0}")]
    Capability(#[from] CapabilityError),

    /// Run directory could not be read
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
