//! Error types for calsync-google

use thiserror::Error;

/// calsync-google error type
#[derive(Error, Debug)]
pub enum GoogleError {
    /// Client credential file missing or unusable
    #[error("Credential file error: {0}")]
    Credentials(String),

    /// Authorization code could not be turned into a linked account
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Calendar events could not be listed
    #[error("Event fetch failed: {0}")]
    FetchFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GoogleError>;
