//! Google Calendar v3 client

use std::time::Duration;

use async_trait::async_trait;
use calsync_core::OAuthToken;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::{debug, error};

use crate::error::{GoogleError, Result};
use crate::models::{EventSummary, EventsResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Upper bound on events returned per request
pub const MAX_EVENTS: usize = 10;

/// Read access to a linked account's calendar
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Upcoming, non-deleted events of the primary calendar in start order,
    /// recurring events expanded, at most [`MAX_EVENTS`]
    async fn upcoming_events(&self, token: &OAuthToken) -> Result<Vec<EventSummary>>;
}

/// Calendar API client authenticated per call with the caller's token
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Events of the primary calendar starting at or after `time_min`
    pub async fn events_after(
        &self,
        token: &OAuthToken,
        time_min: DateTime<Utc>,
    ) -> Result<Vec<EventSummary>> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = MAX_EVENTS.to_string();

        debug!("Listing events after {}", time_min);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token.access_token)
            .query(&[
                ("showDeleted", "false"),
                ("singleEvents", "true"),
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Event listing failed: {} - {}", status, error_text);
            return Err(GoogleError::FetchFailed(format!("{}: {}", status, error_text)));
        }

        let events: EventsResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::FetchFailed(format!("invalid events response: {}", e)))?;

        Ok(events
            .items
            .into_iter()
            .take(MAX_EVENTS)
            .map(EventSummary::from)
            .collect())
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarClient {
    async fn upcoming_events(&self, token: &OAuthToken) -> Result<Vec<EventSummary>> {
        self.events_after(token, Utc::now()).await
    }
}
