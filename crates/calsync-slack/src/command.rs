//! Slash command parsing
//!
//! Slack posts slash commands as `application/x-www-form-urlencoded`.

use calsync_core::Command;
use tracing::debug;

use crate::error::{Result, SlackError};
use crate::verify::VerifiedBody;

/// Form fields of a slash command request that calsync reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub team_id: String,
    pub team_domain: String,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub response_url: String,
}

impl SlashCommandPayload {
    /// Decode the form body. Unknown fields are ignored.
    pub fn from_form(body: &[u8]) -> Self {
        let mut payload = Self::default();

        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "command" => &mut payload.command,
                "team_id" => &mut payload.team_id,
                "team_domain" => &mut payload.team_domain,
                "channel_id" => &mut payload.channel_id,
                "user_id" => &mut payload.user_id,
                "user_name" => &mut payload.user_name,
                "text" => &mut payload.text,
                "response_url" => &mut payload.response_url,
                _ => continue,
            };
            *slot = value.into_owned();
        }

        payload
    }

    /// Convert into a [`Command`], requiring a requester and a channel
    pub fn into_command(self) -> Result<Command> {
        if self.user_id.is_empty() {
            return Err(SlackError::ParseFailed("missing user_id".to_string()));
        }
        if self.channel_id.is_empty() {
            return Err(SlackError::ParseFailed("missing channel_id".to_string()));
        }

        Ok(Command::new(self.user_id, self.channel_id, self.text))
    }
}

/// Parse an authenticated request body into a [`Command`]
pub fn parse_command(body: &VerifiedBody<'_>) -> Result<Command> {
    let payload = SlashCommandPayload::from_form(body.as_bytes());
    debug!(
        "Slash command {} from {} in {}",
        payload.command, payload.user_id, payload.channel_id
    );
    payload.into_command()
}
