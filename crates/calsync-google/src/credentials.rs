//! OAuth client credential file
//!
//! The JSON file downloaded from the Google Cloud console. It wraps the
//! client settings in either a `web` or an `installed` object.

use std::path::Path;

use calsync_core::OAuthClientConfig;
use serde::Deserialize;

use crate::error::{GoogleError, Result};

/// Scopes requested for every authorization: read-only calendar events,
/// the account email and the basic profile
pub const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/calendar.events.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    web: Option<ClientSecret>,
    #[serde(default)]
    installed: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// Parse credential file contents into a client config with [`SCOPES`]
pub fn parse_credentials(json: &str) -> Result<OAuthClientConfig> {
    let file: CredentialFile = serde_json::from_str(json)
        .map_err(|e| GoogleError::Credentials(format!("invalid credential file: {}", e)))?;

    let secret = file.web.or(file.installed).ok_or_else(|| {
        GoogleError::Credentials("credential file has no \"web\" or \"installed\" client".to_string())
    })?;

    let redirect_uri = secret
        .redirect_uris
        .into_iter()
        .next()
        .ok_or_else(|| GoogleError::Credentials("missing redirect URL in credential file".to_string()))?;

    Ok(OAuthClientConfig {
        client_id: secret.client_id,
        client_secret: secret.client_secret,
        auth_uri: secret.auth_uri,
        token_uri: secret.token_uri,
        redirect_uri,
        scopes: SCOPES.iter().map(|scope| scope.to_string()).collect(),
    })
}

/// Read and parse the credential file at `path`
pub fn load_credentials(path: impl AsRef<Path>) -> Result<OAuthClientConfig> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        GoogleError::Credentials(format!("unable to read {}: {}", path.display(), e))
    })?;
    parse_credentials(&json)
}
