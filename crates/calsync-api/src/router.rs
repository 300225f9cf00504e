//! Command routing
//!
//! Decides what a parsed slash command does and completes authorizations
//! when the provider redirects back. Every user-facing outcome ends in one
//! ephemeral message; delivery failures are logged and otherwise ignored.

use std::sync::Arc;

use calsync_core::{Command, IdentityDirectory, IdentityKey};
use calsync_google::{CalendarGateway, EventSummary, OAuth2Broker};
use calsync_slack::Notifier;
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};

pub const NO_EVENTS_MESSAGE: &str = "No upcoming events found!";
pub const EVENTS_HEADER: &str = "Upcoming Events:";
pub const AUTHORIZATION_DENIED_MESSAGE: &str =
    "Authorization was not granted. Run `connect` to try again.";
pub const AUTHORIZATION_UNAVAILABLE_MESSAGE: &str =
    "Unable to start authorization right now. Please try again later.";
pub const EXCHANGE_FAILED_MESSAGE: &str =
    "Unable to connect your account. Run `connect` to try again.";

/// What a command asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent<'a> {
    Connect,
    Get { email: &'a str },
    Unknown,
}

impl<'a> Intent<'a> {
    /// Classify `command`. `connect` must be the whole text; `get` only has
    /// to appear somewhere, with the email taken from the second token.
    pub fn of(command: &'a Command) -> Self {
        if command.text() == "connect" {
            return Intent::Connect;
        }
        if command.raw_text.contains("get") {
            if let Some(email) = command.tokens().nth(1) {
                return Intent::Get { email };
            }
        }
        Intent::Unknown
    }
}

/// Result of routing one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    AuthorizationStarted,
    AuthorizationUnavailable,
    EventsListed(usize),
    NoEvents,
    NotLinked,
    FetchFailed,
    Ignored,
}

/// Result of an authorization callback whose session was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Linked { channel_id: String, email: String },
    Denied { channel_id: String },
    ExchangeFailed { channel_id: String },
}

impl CallbackOutcome {
    /// Channel the authorization was started from
    pub fn channel_id(&self) -> &str {
        match self {
            CallbackOutcome::Linked { channel_id, .. }
            | CallbackOutcome::Denied { channel_id }
            | CallbackOutcome::ExchangeFailed { channel_id } => channel_id,
        }
    }
}

#[derive(Clone)]
pub struct CommandRouter {
    broker: OAuth2Broker,
    directory: IdentityDirectory,
    calendar: Arc<dyn CalendarGateway>,
    notifier: Arc<dyn Notifier>,
}

impl CommandRouter {
    pub fn new(
        broker: OAuth2Broker,
        directory: IdentityDirectory,
        calendar: Arc<dyn CalendarGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            broker,
            directory,
            calendar,
            notifier,
        }
    }

    pub fn broker(&self) -> &OAuth2Broker {
        &self.broker
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    /// Run the action `command` asks for
    pub async fn route(&self, command: &Command) -> RouteOutcome {
        match Intent::of(command) {
            Intent::Connect => self.start_authorization(command).await,
            Intent::Get { email } => self.list_events(command, email).await,
            Intent::Unknown => {
                debug!("Ignoring command text {:?}", command.raw_text);
                RouteOutcome::Ignored
            }
        }
    }

    async fn start_authorization(&self, command: &Command) -> RouteOutcome {
        match self
            .broker
            .build_authorization_url(&command.requester_id, &command.channel_id)
        {
            Ok((url, _session)) => {
                let text = format!("Go to this url to authorize calsync: {}", url);
                self.notify(&command.channel_id, &command.requester_id, &text)
                    .await;
                RouteOutcome::AuthorizationStarted
            }
            Err(e) => {
                warn!("Cannot build authorization URL: {}", e);
                self.notify(
                    &command.channel_id,
                    &command.requester_id,
                    AUTHORIZATION_UNAVAILABLE_MESSAGE,
                )
                .await;
                RouteOutcome::AuthorizationUnavailable
            }
        }
    }

    async fn list_events(&self, command: &Command, email: &str) -> RouteOutcome {
        let key = IdentityKey::new(command.requester_id.as_str(), email);

        let Some(token) = self.directory.get(&key) else {
            info!("No linked account for {}", key);
            let text = format!("{} is not linked. Run `connect` to link it.", email);
            self.notify(&command.channel_id, &command.requester_id, &text)
                .await;
            return RouteOutcome::NotLinked;
        };

        let (text, outcome) = match self.calendar.upcoming_events(&token).await {
            Ok(events) if events.is_empty() => {
                (NO_EVENTS_MESSAGE.to_string(), RouteOutcome::NoEvents)
            }
            Ok(events) => (format_events(&events), RouteOutcome::EventsListed(events.len())),
            Err(e) => {
                warn!("Fetching events for {} failed: {}", key, e);
                (
                    format!("Unable to fetch events for {}. Please try again later.", email),
                    RouteOutcome::FetchFailed,
                )
            }
        };

        self.notify(&command.channel_id, &command.requester_id, &text)
            .await;
        outcome
    }

    /// Finish the authorization identified by `state`.
    ///
    /// Unknown or missing state is rejected before anything is touched.
    /// Otherwise the session is consumed whatever happens next.
    pub async fn complete_authorization(
        &self,
        state: Option<&str>,
        code: Option<&str>,
        error: Option<&str>,
    ) -> Result<CallbackOutcome> {
        let state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::AuthenticationFailed("missing state".to_string()))?;

        let session = self.broker.sessions().consume(state).ok_or_else(|| {
            warn!("Callback with unknown authorization state");
            ApiError::AuthenticationFailed("unknown authorization state".to_string())
        })?;

        let channel_id = session.channel_id.clone();
        let requester_id = session.requester_id.clone();

        if let Some(reason) = error.filter(|e| !e.is_empty()) {
            info!("Authorization for {} denied: {}", requester_id, reason);
            self.notify(&channel_id, &requester_id, AUTHORIZATION_DENIED_MESSAGE)
                .await;
            return Ok(CallbackOutcome::Denied { channel_id });
        }

        match self.broker.link(code.unwrap_or_default(), &session).await {
            Ok(linked) => {
                self.directory
                    .put(IdentityKey::new(requester_id.as_str(), linked.email.as_str()), linked.token);
                let text = format!("{}: account connected!", linked.email);
                self.notify(&channel_id, &requester_id, &text).await;
                Ok(CallbackOutcome::Linked {
                    channel_id,
                    email: linked.email,
                })
            }
            Err(e) => {
                warn!("Linking account for {} failed: {}", requester_id, e);
                self.notify(&channel_id, &requester_id, EXCHANGE_FAILED_MESSAGE)
                    .await;
                Ok(CallbackOutcome::ExchangeFailed { channel_id })
            }
        }
    }

    async fn notify(&self, channel_id: &str, user_id: &str, text: &str) {
        if let Err(e) = self.notifier.notify(channel_id, user_id, text).await {
            warn!("Failed to notify {} in {}: {}", user_id, channel_id, e);
        }
    }
}

/// Event list message: a header line, then one line per event
pub fn format_events(events: &[EventSummary]) -> String {
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(EVENTS_HEADER.to_string());
    lines.extend(events.iter().map(|event| event.to_string()));
    lines.join("\n")
}
