//! Slack Web API client
//!
//! Communicates with Slack Web API

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::{Result, SlackError};
use crate::types::*;

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Slack Web API client
#[derive(Clone)]
pub struct SlackApiClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl SlackApiClient {
    /// Create a new Slack API client
    pub fn new(bot_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SlackError::HttpError)?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Add authorization header
    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.bot_token)
    }

    /// Test authentication
    pub async fn auth_test(&self) -> Result<AuthTestResponse> {
        let url = format!("{}/auth.test", self.base_url);

        debug!("Testing Slack authentication");

        let response = self
            .add_auth(self.client.post(&url))
            .send()
            .await
            .map_err(SlackError::HttpError)?;

        let result: SlackResponse<AuthTestResponse> = response
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        let data = result
            .into_result()
            .map_err(SlackError::ApiError)?
            .ok_or_else(|| SlackError::ParseError("empty auth.test response".to_string()))?;

        info!("Slack auth test successful for team: {}", data.team);
        Ok(data)
    }

    /// Post a message visible only to `user` in `channel`
    pub async fn post_ephemeral(&self, channel: &str, user: &str, text: &str) -> Result<()> {
        let url = format!("{}/chat.postEphemeral", self.base_url);
        let message = PostEphemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
        };

        debug!("Posting ephemeral message to {} in {}", user, channel);

        let response = self
            .add_auth(self.client.post(&url).json(&message))
            .send()
            .await
            .map_err(SlackError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Post ephemeral failed: {} - {}", status, error_text);
            return Err(SlackError::ApiError(format!("{}: {}", status, error_text)));
        }

        let result: SlackResponse<PostEphemeralResponse> = response
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        result.into_result().map_err(SlackError::ApiError)?;
        Ok(())
    }
}
