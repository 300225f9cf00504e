//! calsync-core: shared types for the calsync gateway
//!
//! Slash command model, OAuth token and client types, the identity
//! directory, pending authorization sessions and configuration.

pub mod authorization;
pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod token;

pub use authorization::{AuthorizationSession, AuthorizationSessions, OAuthClientConfig};
pub use command::Command;
pub use config::{Config, GoogleConfig, ServerConfig};
pub use directory::{IdentityDirectory, IdentityKey, LinkedAccount};
pub use error::{Error, Result};
pub use token::OAuthToken;
