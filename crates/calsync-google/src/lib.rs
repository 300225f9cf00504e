//! calsync-google: Google OAuth2 and Calendar integration for calsync
//!
//! ## Features
//!
//! - OAuth client credential file loading
//! - Authorization URL construction and authorization-code exchange
//! - Linked account email lookup via the userinfo endpoint
//! - Upcoming events from the primary calendar (Calendar API v3)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use calsync_core::AuthorizationSessions;
//! use calsync_google::{CalendarGateway, GoogleCalendarClient, OAuth2Broker};
//!
//! let broker = OAuth2Broker::new("credentials.json", AuthorizationSessions::new(), timeout)?;
//! let (url, session) = broker.build_authorization_url("U123", "C123")?;
//!
//! // ...user visits `url`, provider redirects back with `code`...
//! let linked = broker.link(&code, &session).await?;
//!
//! let calendar = GoogleCalendarClient::new(timeout)?;
//! let events = calendar.upcoming_events(&linked.token).await?;
//! ```

pub mod calendar;
pub mod credentials;
pub mod error;
pub mod models;
pub mod oauth;

pub use calendar::{CalendarGateway, GoogleCalendarClient, MAX_EVENTS};
pub use credentials::{SCOPES, load_credentials, parse_credentials};
pub use error::{GoogleError, Result};
pub use models::EventSummary;
pub use oauth::{LinkedIdentity, OAuth2Broker};
