//! Desktop notifications for a GitHub user's received-events feed.
//!
//! [`poll::PollLoop`] fetches the feed through an [`source::EventSource`],
//! keeps only recent events that have not been shown yet, formats them with
//! [`format::format_event`] and hands them to a [`notify::NotificationSink`].

pub mod dedup;
pub mod error;
pub mod event;
pub mod format;
pub mod notify;
pub mod poll;
pub mod source;

pub use dedup::DedupWindow;
pub use error::{DispatchError, FetchError, PayloadDecodeError};
pub use event::{Event, EventKind, EventPayload};
pub use format::{FormattedNotification, format_event};
pub use notify::{LogNotifier, Notification, NotificationSink, Sound, TerminalNotifier};
pub use poll::{PollConfig, PollLoop, TickReport, select_recent};
pub use source::{Credentials, EventSource, GitHubEventSource};
