//! Fetching the received-events feed.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::event::Event;

pub const GITHUB_API: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("github-notifier/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Basic-auth credentials for the feed owner.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Something that can return the most recent events for a user, newest first.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self, credentials: &Credentials) -> Result<Vec<Event>, FetchError>;
}

/// Reads `/users/{username}/received_events` from the GitHub REST API.
pub struct GitHubEventSource {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubEventSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(GITHUB_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn events_url(&self, username: &str) -> String {
        format!("{}/users/{username}/received_events?page=0", self.base_url)
    }
}

#[async_trait]
impl EventSource for GitHubEventSource {
    async fn fetch(&self, credentials: &Credentials) -> Result<Vec<Event>, FetchError> {
        let url = self.events_url(&credentials.username);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|e| {
                debug!(error = %e, "failed to read error response body");
                String::new()
            });
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        decode_feed(&bytes)
    }
}

/// Decode a feed body. The body must be a JSON array; elements that are not
/// usable events are logged and skipped without failing the batch.
pub fn decode_feed(body: &[u8]) -> Result<Vec<Event>, FetchError> {
    let values: Vec<Value> = serde_json::from_slice(body)?;
    let mut events = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Event>(value) {
            Ok(event) => events.push(event),
            Err(e) => warn!(index, error = %e, "skipping malformed feed entry"),
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn builds_received_events_url() {
        let source = GitHubEventSource::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(
            source.events_url("octocat"),
            "http://localhost:8080/users/octocat/received_events?page=0"
        );
    }

    #[test]
    fn default_source_points_at_github() {
        let source = GitHubEventSource::new().unwrap();
        assert_eq!(
            source.events_url("me"),
            "https://api.github.com/users/me/received_events?page=0"
        );
    }

    #[test]
    fn decodes_feed_in_upstream_order() {
        let body = br#"[
            {"id": "2", "type": "PushEvent", "actor": {"login": "x"}, "repo": {"name": "a/b"},
             "payload": {"ref": "refs/heads/main"}, "created_at": "2024-05-01T12:05:00Z"},
            {"id": "1", "type": "WatchEvent", "actor": {"login": "y"}, "repo": {"name": "c/d"},
             "payload": {"action": "started"}, "created_at": "2024-05-01T12:00:00Z"}
        ]"#;

        let events = decode_feed(body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "2");
        assert_eq!(events[0].kind, EventKind::Push);
        assert_eq!(events[1].id, "1");
        assert_eq!(events[1].actor_login, "y");
    }

    #[test]
    fn skips_entries_without_usable_envelope() {
        let body = br#"[
            {"id": "3", "type": "WatchEvent", "created_at": "2024-05-01T12:05:00Z"},
            {"type": "WatchEvent", "created_at": "2024-05-01T12:04:00Z"},
            {"id": "1", "type": "WatchEvent", "created_at": "not a date"},
            "garbage"
        ]"#;

        let events = decode_feed(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "3");
    }

    #[test]
    fn non_array_body_is_a_decode_error() {
        let err = decode_feed(br#"{"message": "Bad credentials"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "me".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
