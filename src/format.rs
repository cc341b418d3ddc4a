//! Per-kind message templates.

use tracing::warn;

use crate::event::{Event, EventKind, EventPayload};

/// Message, deep link and title for a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedNotification {
    pub message: String,
    pub link: String,
    pub title: String,
}

fn repo_link(repo: &str) -> String {
    format!("http://github.com/{repo}")
}

/// Format an event for display.
///
/// Returns `None` when the event should be dropped, which only happens for
/// an `IssuesEvent` whose payload cannot be decoded. Other malformed payloads
/// fall back to the default template.
pub fn format_event(event: &Event) -> Option<FormattedNotification> {
    let repo = event.repo_name.as_str();

    let payload = match event.decode_payload() {
        Ok(payload) => payload,
        Err(e) if event.kind == EventKind::Issues => {
            warn!(id = %event.id, error = %e, "dropping event");
            return None;
        }
        Err(e) => {
            warn!(id = %event.id, error = %e, "using default format");
            return Some(format_default(event));
        }
    };

    let (message, link) = match (&event.kind, payload) {
        (EventKind::Watch, _) => (format!("starred {repo}"), repo_link(repo)),
        (EventKind::Create, _) => (format!("created {repo}"), repo_link(repo)),
        (EventKind::Public, _) => (format!("made {repo} public"), repo_link(repo)),
        (
            EventKind::Issues,
            EventPayload::Issues {
                action,
                number,
                html_url,
            },
        ) => (format!("{action} Issue {repo}/issues/{number}"), html_url),
        (
            EventKind::Fork,
            EventPayload::Fork {
                full_name,
                html_url,
            },
        ) => (format!("forked {repo} to {full_name}"), html_url),
        (EventKind::Push, EventPayload::Push { git_ref }) => {
            (format!("pushed to {repo} at {git_ref}"), repo_link(repo))
        }
        _ => return Some(format_default(event)),
    };

    Some(FormattedNotification {
        message,
        link,
        title: event.actor_login.clone(),
    })
}

fn format_default(event: &Event) -> FormattedNotification {
    FormattedNotification {
        message: format!("{} {}", event.actor_login, event.repo_name),
        link: repo_link(&event.repo_name),
        title: event.actor_login.clone(),
    }
}
