//! Data models for the Google APIs calsync talks to

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Token endpoint error body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// userinfo v2 response
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// events.list response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub items: Vec<EventItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventItem {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
}

/// Either a timed start (`dateTime`) or an all-day start (`date`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One upcoming event as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub summary: String,
    pub start: String,
}

impl EventSummary {
    pub fn new(summary: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            start: start.into(),
        }
    }
}

impl From<EventItem> for EventSummary {
    fn from(item: EventItem) -> Self {
        let summary = item
            .summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(no title)".to_string());

        let start = item
            .start
            .and_then(|start| start.date_time.filter(|s| !s.is_empty()).or(start.date))
            .unwrap_or_default();

        Self { summary, start }
    }
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.summary, self.start)
    }
}
