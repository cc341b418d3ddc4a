//! Feed events as delivered by the GitHub events API.
//!
//! The envelope (`id`, `type`, `actor`, `repo`, `created_at`) is decoded
//! eagerly. The `payload` document stays opaque until [`Event::decode_payload`]
//! maps it onto one of the shapes the formatter understands.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PayloadDecodeError;

/// The event type tag, closed over the kinds that get a dedicated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Watch,
    Create,
    Public,
    Issues,
    Fork,
    Push,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "WatchEvent" => Self::Watch,
            "CreateEvent" => Self::Create,
            "PublicEvent" => Self::Public,
            "IssuesEvent" => Self::Issues,
            "ForkEvent" => Self::Fork,
            "PushEvent" => Self::Push,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Watch => "WatchEvent",
            Self::Create => "CreateEvent",
            Self::Public => "PublicEvent",
            Self::Issues => "IssuesEvent",
            Self::Fork => "ForkEvent",
            Self::Push => "PushEvent",
            Self::Other(tag) => tag,
        };
        f.write_str(tag)
    }
}

/// One occurrence on the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawEvent")]
pub struct Event {
    pub id: String,
    pub kind: EventKind,
    pub actor_login: String,
    pub repo_name: String,
    pub created_at: DateTime<Utc>,
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    actor: Actor,
    #[serde(default)]
    repo: Repository,
    created_at: DateTime<Utc>,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Default, Deserialize)]
struct Actor {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Default, Deserialize)]
struct Repository {
    #[serde(default)]
    name: String,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Self {
            id: raw.id,
            kind: EventKind::from(raw.kind.as_str()),
            actor_login: raw.actor.login,
            repo_name: raw.repo.name,
            created_at: raw.created_at,
            payload: raw.payload,
        }
    }
}

/// The payload fields each kind needs, or `Plain` for kinds that need none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Issues {
        action: String,
        number: u64,
        html_url: String,
    },
    Fork {
        full_name: String,
        html_url: String,
    },
    Push {
        git_ref: String,
    },
    Plain,
}

#[derive(Deserialize)]
struct IssuesPayload {
    action: String,
    issue: IssueRef,
}

#[derive(Deserialize)]
struct IssueRef {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct ForkPayload {
    forkee: Forkee,
}

#[derive(Deserialize)]
struct Forkee {
    full_name: String,
    html_url: String,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

impl Event {
    /// Decode the payload into the shape required by this event's kind.
    pub fn decode_payload(&self) -> Result<EventPayload, PayloadDecodeError> {
        let wrap = |source| PayloadDecodeError {
            kind: self.kind.to_string(),
            source,
        };

        match self.kind {
            EventKind::Issues => {
                let p = IssuesPayload::deserialize(&self.payload).map_err(wrap)?;
                Ok(EventPayload::Issues {
                    action: p.action,
                    number: p.issue.number,
                    html_url: p.issue.html_url,
                })
            }
            EventKind::Fork => {
                let p = ForkPayload::deserialize(&self.payload).map_err(wrap)?;
                Ok(EventPayload::Fork {
                    full_name: p.forkee.full_name,
                    html_url: p.forkee.html_url,
                })
            }
            EventKind::Push => {
                let p = PushPayload::deserialize(&self.payload).map_err(wrap)?;
                Ok(EventPayload::Push { git_ref: p.git_ref })
            }
            _ => Ok(EventPayload::Plain),
        }
    }
}
