//! calsync-slack: Slack side of the calsync gateway
//!
//! Verifies signed slash command requests, parses them into [`Command`]s
//! and delivers ephemeral replies through the Slack Web API.
//!
//! [`Command`]: calsync_core::Command

pub mod api;
pub mod command;
pub mod error;
pub mod notifier;
pub mod types;
pub mod verify;

pub use api::SlackApiClient;
pub use command::{SlashCommandPayload, parse_command};
pub use error::{Result, SlackError};
pub use notifier::Notifier;
pub use verify::{SignatureVerifier, VerifiedBody};
