//! Slack API types

use serde::{Deserialize, Serialize};

/// chat.postEphemeral request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEphemeral {
    pub channel: String,
    pub user: String,
    pub text: String,
}

/// API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> SlackResponse<T> {
    /// Convert `ok: false` into the API error string
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error".to_string()))
        }
    }
}

/// Auth test response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTestResponse {
    pub url: String,
    pub team: String,
    pub user: String,
    pub team_id: String,
    pub user_id: String,
    pub bot_id: Option<String>,
}

/// Post ephemeral response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEphemeralResponse {
    pub message_ts: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let response: SlackResponse<PostEphemeralResponse> =
            serde_json::from_str(r#"{"ok":false,"error":"user_not_in_channel"}"#).unwrap();
        assert_eq!(response.into_result().unwrap_err(), "user_not_in_channel");
    }

    #[test]
    fn test_ok_response() {
        let response: SlackResponse<PostEphemeralResponse> =
            serde_json::from_str(r#"{"ok":true,"message_ts":"1502210682.580145"}"#).unwrap();
        let data = response.into_result().unwrap().unwrap();
        assert_eq!(data.message_ts, "1502210682.580145");
    }
}
