//! Error types for calsync-core

use thiserror::Error;

/// Main error type for calsync-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for calsync-core
pub type Result<T> = std::result::Result<T, Error>;
