//! OAuth2 authorization code flow
//!
//! `connect` opens an [`AuthorizationSession`] and hands the user an
//! authorization URL. The provider later redirects back with the session's
//! state token and a code, which [`OAuth2Broker::link`] exchanges for a token
//! and resolves to the account's email.

use std::path::PathBuf;
use std::time::Duration;

use calsync_core::{AuthorizationSession, AuthorizationSessions, OAuthClientConfig, OAuthToken};
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::credentials::load_credentials;
use crate::error::{GoogleError, Result};
use crate::models::{TokenErrorResponse, TokenResponse, UserInfo};

const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Result of a completed authorization
#[derive(Debug, Clone)]
pub struct LinkedIdentity {
    pub email: String,
    pub token: OAuthToken,
}

/// Builds authorization URLs and exchanges authorization codes
#[derive(Clone)]
pub struct OAuth2Broker {
    client: Client,
    credentials_path: PathBuf,
    sessions: AuthorizationSessions,
    userinfo_url: String,
}

impl OAuth2Broker {
    /// Create a broker reading client settings from `credentials_path`
    pub fn new(
        credentials_path: impl Into<PathBuf>,
        sessions: AuthorizationSessions,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            credentials_path: credentials_path.into(),
            sessions,
            userinfo_url: DEFAULT_USERINFO_URL.to_string(),
        })
    }

    /// Override the userinfo endpoint
    pub fn with_userinfo_url(mut self, userinfo_url: impl Into<String>) -> Self {
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Pending authorization sessions
    pub fn sessions(&self) -> &AuthorizationSessions {
        &self.sessions
    }

    /// Open a session for `requester_id` and return the URL they must visit.
    ///
    /// The credential file is read on every call.
    pub fn build_authorization_url(
        &self,
        requester_id: &str,
        channel_id: &str,
    ) -> Result<(Url, AuthorizationSession)> {
        let config = load_credentials(&self.credentials_path)?;
        let session = self.sessions.begin(config, requester_id, channel_id);

        let url = match authorization_url(&session.config, &session.state_token) {
            Ok(url) => url,
            Err(e) => {
                self.sessions.consume(&session.state_token);
                return Err(e);
            }
        };

        info!("Issued authorization URL for {}", requester_id);
        Ok((url, session))
    }

    /// Exchange an authorization code for a token
    pub async fn exchange(&self, code: &str, session: &AuthorizationSession) -> Result<OAuthToken> {
        if code.is_empty() {
            return Err(GoogleError::ExchangeFailed("empty authorization code".to_string()));
        }

        let config = &session.config;
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        debug!("Exchanging authorization code at {}", config.token_uri);

        let response = self
            .client
            .post(&config.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::ExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(GoogleError::ExchangeFailed(format!("{}: {}", status, reason)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::ExchangeFailed(format!("invalid token response: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(GoogleError::ExchangeFailed("token response without access_token".to_string()));
        }

        Ok(OAuthToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    /// Look up the email of the account `token` was issued for
    pub async fn resolve_email(&self, token: &OAuthToken) -> Result<String> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| GoogleError::ExchangeFailed(format!("userinfo request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoogleError::ExchangeFailed(format!("userinfo returned {}", status)));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| GoogleError::ExchangeFailed(format!("invalid userinfo response: {}", e)))?;

        info.email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| GoogleError::ExchangeFailed("userinfo response has no email".to_string()))
    }

    /// Exchange `code` and resolve the linked email
    pub async fn link(&self, code: &str, session: &AuthorizationSession) -> Result<LinkedIdentity> {
        let token = self.exchange(code, session).await.inspect_err(|e| {
            warn!("Code exchange for {} failed: {}", session.requester_id, e);
        })?;
        let email = self.resolve_email(&token).await?;

        info!("Linked {} for {}", email, session.requester_id);
        Ok(LinkedIdentity { email, token })
    }
}

/// Authorization URL for `config` carrying `state`
pub fn authorization_url(config: &OAuthClientConfig, state: &str) -> Result<Url> {
    let mut url = Url::parse(&config.auth_uri)
        .map_err(|e| GoogleError::Credentials(format!("invalid auth_uri: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scopes.join(" "))
        .append_pair("state", state);

    Ok(url)
}
