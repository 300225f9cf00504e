//! Parsed slash command

use serde::{Deserialize, Serialize};

/// A single slash command invocation.
///
/// Built once per verified inbound request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Chat user that issued the command
    pub requester_id: String,
    /// Channel the command was issued in
    pub channel_id: String,
    /// Free text following the slash command
    pub raw_text: String,
}

impl Command {
    /// Create a new command
    pub fn new(
        requester_id: impl Into<String>,
        channel_id: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            channel_id: channel_id.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Whitespace-separated tokens of the command text
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.raw_text.split_whitespace()
    }

    /// Command text without surrounding whitespace
    pub fn text(&self) -> &str {
        self.raw_text.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let command = Command::new("U1", "C1", "  get   alice@example.com ");
        let tokens: Vec<&str> = command.tokens().collect();
        assert_eq!(tokens, vec!["get", "alice@example.com"]);
        assert_eq!(command.text(), "get   alice@example.com");
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        let command = Command::new("U1", "C1", "");
        assert_eq!(command.tokens().count(), 0);
    }
}
