//! Configuration management
//!
//! Settings are resolved in this order of precedence:
//! 1. Environment variables
//! 2. `config.yml`
//! 3. Defaults
//!
//! `${VAR_NAME}` references inside the YAML file are expanded from the
//! environment before parsing.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Main configuration for calsync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Slack bot user ID
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Slack bot token (xoxb-...)
    #[serde(default)]
    pub slack_token: String,

    /// Slack signing secret used to verify slash command requests
    #[serde(default)]
    pub slack_signing_secret: String,

    /// Workspace subdomain used for the post-authorization redirect
    #[serde(default)]
    pub slack_team_domain: Option<String>,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Google OAuth2 / Calendar configuration
    #[serde(default)]
    pub google: GoogleConfig,

    /// Timeout applied to every outbound HTTP call
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Age after which an unfinished authorization is discarded
    #[serde(default = "default_authorization_ttl_secs")]
    pub authorization_ttl_secs: u64,

    /// Optional log file written in addition to stderr
    #[serde(default)]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Site verification file served verbatim at `/<file name>`
    #[serde(default = "default_verification_file")]
    pub verification_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            verification_file: default_verification_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Path to the OAuth client credential file downloaded from Google
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_verification_file() -> String {
    "googleb6de904a41249ac0.html".to_string()
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_authorization_ttl_secs() -> u64 {
    600
}

impl Config {
    /// Create a config with the given Slack credentials and defaults elsewhere
    pub fn new(slack_token: impl Into<String>, slack_signing_secret: impl Into<String>) -> Self {
        Self {
            bot_id: None,
            slack_token: slack_token.into(),
            slack_signing_secret: slack_signing_secret.into(),
            slack_team_domain: None,
            server: ServerConfig::default(),
            google: GoogleConfig::default(),
            http_timeout_secs: default_http_timeout_secs(),
            authorization_ttl_secs: default_authorization_ttl_secs(),
            log_file: None,
        }
    }

    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse a YAML document, expanding environment references first
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML file.
    ///
    /// Environment variables override values from the file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load from `path`, or from `config.yml` if it exists, or from the
    /// environment alone.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_yaml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::from_yaml_file(DEFAULT_CONFIG_PATH);
        }

        let mut config = Self::new(String::new(), String::new());
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Ok(bot_id) = std::env::var("BOT_ID") {
            if !bot_id.is_empty() {
                self.bot_id = Some(bot_id);
            }
        }
        if let Ok(token) = std::env::var("SLACK_TOKEN") {
            if !token.is_empty() {
                self.slack_token = token;
            }
        }
        if let Ok(secret) = std::env::var("SLACK_SIGNING_SECRET") {
            if !secret.is_empty() {
                self.slack_signing_secret = secret;
            }
        }
        if let Ok(domain) = std::env::var("SLACK_TEAM_DOMAIN") {
            if !domain.is_empty() {
                self.slack_team_domain = Some(domain);
            }
        }
        if let Ok(port) = std::env::var("CALSYNC_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(path) = std::env::var("GOOGLE_CREDENTIALS_PATH") {
            if !path.is_empty() {
                self.google.credentials_path = path;
            }
        }
        if let Ok(path) = std::env::var("CALSYNC_LOG_FILE") {
            if !path.is_empty() {
                self.log_file = Some(path);
            }
        }
    }

    /// Check that the required Slack credentials are present
    pub fn validate(&self) -> Result<()> {
        if self.slack_token.trim().is_empty() {
            return Err(Error::Config("slack_token is not set".to_string()));
        }
        if self.slack_signing_secret.trim().is_empty() {
            return Err(Error::Config("slack_signing_secret is not set".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::Config("http_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Timeout for outbound provider calls
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Lifetime of a pending authorization session
    pub fn authorization_ttl(&self) -> Duration {
        Duration::from_secs(self.authorization_ttl_secs)
    }

    /// Deep link that opens `channel_id` in the Slack client
    pub fn slack_redirect_url(&self, channel_id: &str) -> String {
        match &self.slack_team_domain {
            Some(domain) => format!(
                "https://{}.slack.com/app_redirect?channel={}",
                domain, channel_id
            ),
            None => format!("https://slack.com/app_redirect?channel={}", channel_id),
        }
    }
}
