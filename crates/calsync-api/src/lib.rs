//! calsync-api: HTTP surface of the calsync gateway
//!
//! Receives Slack slash commands and Google OAuth redirects.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use router::{CallbackOutcome, CommandRouter, Intent, RouteOutcome};
pub use server::{AppState, app, spawn_session_sweeper, start_server};
