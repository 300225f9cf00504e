//! Shared fixtures for calsync-api integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use calsync_api::{AppState, CommandRouter, app};
use calsync_core::{AuthorizationSessions, Config, IdentityDirectory, OAuthToken};
use calsync_google::{CalendarGateway, EventSummary, GoogleError, OAuth2Broker};
use calsync_slack::{Notifier, SignatureVerifier, SlackError};
use calsync_slack::verify::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use http::{Request, Response};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const LINKED_EMAIL: &str = "alice@example.com";
pub const GOOD_CODE: &str = "good-code";
pub const VERIFICATION_CONTENT: &str = "google-site-verification: googletest.html";

/// One message handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
}

/// Notifier that records every message, optionally failing to deliver it
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Record but report every later delivery as failed
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages were sent
    pub async fn wait_for(&self, count: usize) -> Vec<Sent> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} notifications, got {:?}", count, self.sent());
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, channel_id: &str, user_id: &str, text: &str) -> calsync_slack::Result<()> {
        self.sent.lock().unwrap().push(Sent {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlackError::ApiError("channel_not_found".to_string()));
        }
        Ok(())
    }
}

/// Calendar with canned events, or a canned failure
pub struct FakeCalendar {
    events: Option<Vec<EventSummary>>,
    tokens_seen: Mutex<Vec<String>>,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<EventSummary>) -> Self {
        Self {
            events: Some(events),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            events: None,
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarGateway for FakeCalendar {
    async fn upcoming_events(&self, token: &OAuthToken) -> calsync_google::Result<Vec<EventSummary>> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(token.access_token.clone());
        self.events
            .clone()
            .ok_or_else(|| GoogleError::FetchFailed("calendar unavailable".to_string()))
    }
}

/// A fully wired application against a mock OAuth provider
pub struct TestApp {
    pub app: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub calendar: Arc<FakeCalendar>,
    pub directory: IdentityDirectory,
    pub sessions: AuthorizationSessions,
    pub provider: MockServer,
    verifier: SignatureVerifier,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new(calendar: FakeCalendar) -> Self {
        Self::with_team_domain(calendar, None).await
    }

    pub async fn with_team_domain(calendar: FakeCalendar, team_domain: Option<&str>) -> Self {
        let provider = MockServer::start().await;
        mount_provider(&provider).await;

        let dir = tempfile::tempdir().unwrap();
        let credentials_path = dir.path().join("credentials.json");
        std::fs::write(
            &credentials_path,
            serde_json::json!({
                "web": {
                    "client_id": "client-123",
                    "client_secret": "secret-456",
                    "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                    "token_uri": format!("{}/token", provider.uri()),
                    "redirect_uris": ["https://calsync.example.com/callback"]
                }
            })
            .to_string(),
        )
        .unwrap();

        let verification_path = dir.path().join("googletest.html");
        std::fs::write(&verification_path, VERIFICATION_CONTENT).unwrap();

        let mut config = Config::new("xoxb-test", SIGNING_SECRET);
        config.slack_team_domain = team_domain.map(str::to_string);
        config.google.credentials_path = credentials_path.to_string_lossy().into_owned();
        config.server.verification_file = verification_path.to_string_lossy().into_owned();

        let sessions = AuthorizationSessions::new();
        let broker = OAuth2Broker::new(credentials_path.clone(), sessions.clone(), config.http_timeout())
            .unwrap()
            .with_userinfo_url(format!("{}/userinfo", provider.uri()));

        let directory = IdentityDirectory::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let calendar = Arc::new(calendar);

        let router = CommandRouter::new(
            broker,
            directory.clone(),
            calendar.clone(),
            notifier.clone(),
        );
        let app = app(AppState::new(config, router));

        Self {
            app,
            notifier,
            calendar,
            directory,
            sessions,
            provider,
            verifier: SignatureVerifier::new(SIGNING_SECRET),
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Slash command request signed with the test secret
    pub fn signed_command(&self, user_id: &str, channel_id: &str, text: &str) -> Request<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("command", "/calsync")
            .append_pair("team_id", "T1")
            .append_pair("channel_id", channel_id)
            .append_pair("user_id", user_id)
            .append_pair("text", text)
            .finish();
        self.signed_body(body)
    }

    pub fn signed_body(&self, body: String) -> Request<Body> {
        let timestamp = unix_now().to_string();
        let signature = self.verifier.sign(&timestamp, body.as_bytes()).unwrap();

        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header(TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap()
    }

    pub fn get(&self, uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Run `connect` for `user_id` and return the issued state token
    pub async fn connect(&self, user_id: &str, channel_id: &str) -> String {
        let before = self.notifier.sent().len();
        let response = self.send(self.signed_command(user_id, channel_id, "connect")).await;
        assert_eq!(response.status(), 200);

        let sent = self.notifier.wait_for(before + 1).await;
        state_from_prompt(&sent[before].text)
    }
}

/// Extract the `state` parameter from an authorization prompt
pub fn state_from_prompt(text: &str) -> String {
    let url = text
        .strip_prefix("Go to this url to authorize calsync: ")
        .unwrap_or_else(|| panic!("not an authorization prompt: {}", text));
    let url = url::Url::parse(url).unwrap();
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

async fn mount_provider(provider: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(format!("code={}", GOOD_CODE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.linked",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .with_priority(1)
        .mount(provider)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .with_priority(2)
        .mount(provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "42",
            "email": LINKED_EMAIL
        })))
        .mount(provider)
        .await;
}
