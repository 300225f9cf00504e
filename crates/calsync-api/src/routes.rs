//! Route definitions

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeFile;

use crate::handlers::{callback, health, slash_command};
use crate::server::AppState;

/// Create the router.
///
/// `verification_file` is served verbatim under its own file name.
pub fn routes(verification_file: &str) -> Router<AppState> {
    let router = Router::new()
        // Slack slash commands
        .route("/", post(slash_command))
        // OAuth redirect
        .route("/callback", get(callback))
        // Health check
        .route("/health", get(health));

    match Path::new(verification_file)
        .file_name()
        .and_then(|name| name.to_str())
    {
        Some(name) => router.route_service(&format!("/{}", name), ServeFile::new(verification_file)),
        None => router,
    }
}
