//! HTTP handlers
//!
//! Slash command intake, the OAuth redirect callback and health check.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
};
use calsync_slack::parse_command;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::server::AppState;

/// Query parameters of the provider redirect
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Slash command endpoint.
///
/// The request is verified and parsed from the same body bytes, then
/// acknowledged at once. Routing continues in the background and replies
/// through the notifier.
pub async fn slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let verified = state.verifier.verify(&headers, &body)?;
    let command = parse_command(&verified)?;

    debug!("Accepted command from {}", command.requester_id);

    let router = state.router.clone();
    tokio::spawn(async move {
        let outcome = router.route(&command).await;
        debug!("Command from {} routed: {:?}", command.requester_id, outcome);
    });

    Ok(StatusCode::OK)
}

/// OAuth redirect endpoint; sends the browser back to the Slack channel
/// the authorization was started from
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let outcome = state
        .router
        .complete_authorization(
            params.state.as_deref(),
            params.code.as_deref(),
            params.error.as_deref(),
        )
        .await?;

    info!("Authorization callback finished: {:?}", outcome);

    let target = state.config.slack_redirect_url(outcome.channel_id());
    Ok(Redirect::temporary(&target))
}
