//! エラー型定義 (calsync-slack)

use thiserror::Error;

/// calsync-slack のエラー型
#[derive(Error, Debug)]
pub enum SlackError {
    /// Missing, stale or mismatched request signature
    #[error("Request authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Slash command body is missing required fields
    #[error("Malformed slash command: {0}")]
    ParseFailed(String),

    #[error("Slack API error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, SlackError>;
