//! Pending OAuth authorization sessions
//!
//! One entry per issued authorization URL, keyed by its state token.
//! An entry is created when a user runs `connect` and removed exactly once,
//! either when the matching callback consumes it or when it expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// OAuth2 client settings loaded from the provider-issued credential file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// One in-flight authorization request
#[derive(Debug, Clone)]
pub struct AuthorizationSession {
    /// Opaque nonce echoed back by the provider on redirect
    pub state_token: String,
    /// Client settings the authorization URL was built with
    pub config: OAuthClientConfig,
    /// Chat user that ran `connect`
    pub requester_id: String,
    /// Channel `connect` was run in
    pub channel_id: String,
    pub created_at: DateTime<Utc>,
}

/// Concurrent table of pending authorization sessions
#[derive(Clone, Default)]
pub struct AuthorizationSessions {
    sessions: Arc<DashMap<String, AuthorizationSession>>,
}

impl AuthorizationSessions {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session with a fresh, unused state token
    pub fn begin(
        &self,
        config: OAuthClientConfig,
        requester_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> AuthorizationSession {
        let requester_id = requester_id.into();
        let channel_id = channel_id.into();

        loop {
            let state_token = uuid::Uuid::new_v4().simple().to_string();
            if let Entry::Vacant(slot) = self.sessions.entry(state_token.clone()) {
                let session = AuthorizationSession {
                    state_token,
                    config,
                    requester_id,
                    channel_id,
                    created_at: Utc::now(),
                };
                slot.insert(session.clone());
                debug!("Opened authorization session for {}", session.requester_id);
                return session;
            }
        }
    }

    /// Remove and return the session for `state_token`.
    ///
    /// The comparison is exact; a second call with the same token returns
    /// `None`.
    pub fn consume(&self, state_token: &str) -> Option<AuthorizationSession> {
        self.sessions.remove(state_token).map(|(_, session)| session)
    }

    /// Check whether a session is pending for `state_token`
    pub fn contains(&self, state_token: &str) -> bool {
        self.sessions.contains_key(state_token)
    }

    /// Drop sessions older than `ttl`, returning how many were removed
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let now = Utc::now();
        let before = self.sessions.len();

        self.sessions.retain(|_, session| now - session.created_at < ttl);

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!("Purged {} abandoned authorization sessions", removed);
        }
        removed
    }

    /// Number of pending sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_config() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            auth_uri: "https://accounts.example.com/auth".to_string(),
            token_uri: "https://accounts.example.com/token".to_string(),
            redirect_uri: "https://calsync.example.com/callback".to_string(),
            scopes: vec!["email".to_string()],
        }
    }

    #[test]
    fn test_begin_issues_unique_tokens() {
        let sessions = AuthorizationSessions::new();
        let first = sessions.begin(client_config(), "U1", "C1");
        let second = sessions.begin(client_config(), "U1", "C1");

        assert!(!first.state_token.is_empty());
        assert_ne!(first.state_token, second.state_token);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_consume_exactly_once() {
        let sessions = AuthorizationSessions::new();
        let session = sessions.begin(client_config(), "U1", "C1");

        let consumed = sessions.consume(&session.state_token).unwrap();
        assert_eq!(consumed.requester_id, "U1");
        assert_eq!(consumed.channel_id, "C1");
        assert!(sessions.consume(&session.state_token).is_none());
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_consume_unknown_token() {
        let sessions = AuthorizationSessions::new();
        let session = sessions.begin(client_config(), "U1", "C1");

        let mut tampered = session.state_token.clone();
        tampered.push('x');
        assert!(sessions.consume(&tampered).is_none());
        assert!(sessions.contains(&session.state_token));
    }

    #[test]
    fn test_concurrent_users_do_not_clobber() {
        let sessions = AuthorizationSessions::new();
        let alice = sessions.begin(client_config(), "U1", "C1");
        let bob = sessions.begin(client_config(), "U2", "C2");

        assert_eq!(sessions.consume(&bob.state_token).unwrap().requester_id, "U2");
        assert_eq!(sessions.consume(&alice.state_token).unwrap().requester_id, "U1");
    }

    #[test]
    fn test_purge_expired() {
        let sessions = AuthorizationSessions::new();
        sessions.begin(client_config(), "U1", "C1");

        assert_eq!(sessions.purge_expired(Duration::from_secs(600)), 0);
        assert_eq!(sessions.len(), 1);

        assert_eq!(sessions.purge_expired(Duration::ZERO), 1);
        assert!(sessions.is_empty());
    }
}
