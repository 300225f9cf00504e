//! In-memory identity directory
//!
//! Thread-safe `(chat user, email) -> token` storage using DashMap

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::token::OAuthToken;

/// Composite key addressing one linked account of one chat user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    requester_id: String,
    email: String,
}

impl IdentityKey {
    /// Create a key from a chat user ID and a linked email
    pub fn new(requester_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            requester_id: requester_id.into(),
            email: email.into(),
        }
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.requester_id, self.email)
    }
}

/// A chat user's linked calendar account
#[derive(Debug, Clone)]
pub struct LinkedAccount {
    pub identity_key: IdentityKey,
    pub token: OAuthToken,
    pub linked_at: DateTime<Utc>,
}

/// Concurrent directory of linked accounts.
///
/// Lookups are exact-match on both requester and email. There is no removal:
/// accounts live until the process exits.
#[derive(Clone, Default)]
pub struct IdentityDirectory {
    accounts: Arc<DashMap<IdentityKey, LinkedAccount>>,
}

impl IdentityDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token, replacing any token already linked under the same key
    pub fn put(&self, key: IdentityKey, token: OAuthToken) {
        let account = LinkedAccount {
            identity_key: key.clone(),
            token,
            linked_at: Utc::now(),
        };
        if self.accounts.insert(key, account).is_some() {
            debug!("Replaced existing linked account");
        }
    }

    /// Look up the token linked under `key`
    pub fn get(&self, key: &IdentityKey) -> Option<OAuthToken> {
        self.accounts.get(key).map(|entry| entry.token.clone())
    }

    /// Look up the full linked account under `key`
    pub fn account(&self, key: &IdentityKey) -> Option<LinkedAccount> {
        self.accounts.get(key).map(|entry| entry.clone())
    }

    /// Number of linked accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
