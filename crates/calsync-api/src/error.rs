//! エラー型定義 (calsync-api)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use calsync_slack::SlackError;
use thiserror::Error;
use tracing::{error, warn};

/// calsync-api のエラー型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Slack error: {0}")]
    Slack(SlackError),
}

impl From<SlackError> for ApiError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::AuthenticationFailed(reason) => ApiError::AuthenticationFailed(reason),
            SlackError::ParseFailed(reason) => ApiError::InvalidRequest(reason),
            other => ApiError::Slack(other),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
