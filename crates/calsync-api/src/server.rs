//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use calsync_core::{AuthorizationSessions, Config};
use calsync_slack::SignatureVerifier;
use tokio::time::interval;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::router::CommandRouter;
use crate::routes::routes;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: SignatureVerifier,
    pub router: CommandRouter,
}

impl AppState {
    pub fn new(config: Config, router: CommandRouter) -> Self {
        let verifier = SignatureVerifier::new(config.slack_signing_secret.clone());
        Self {
            config: Arc::new(config),
            verifier,
            router,
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let verification_file = state.config.server.verification_file.clone();

    Router::new()
        .merge(routes(&verification_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server and run until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    let app = app(state);

    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Periodically drop authorization sessions older than `ttl`.
///
/// A zero `ttl` disables the sweep.
pub fn spawn_session_sweeper(
    sessions: AuthorizationSessions,
    ttl: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if ttl.is_zero() {
        return None;
    }

    let period = ttl.min(SWEEP_INTERVAL);
    Some(tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            sessions.purge_expired(ttl);
        }
    }))
}
