use thiserror::Error;

/// Failure to fetch a batch of events. The whole tick is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to event feed failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("event feed returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("event feed returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A type-specific payload did not have the expected shape.
#[derive(Debug, Error)]
#[error("failed to decode {kind} payload: {source}")]
pub struct PayloadDecodeError {
    pub kind: String,
    #[source]
    pub source: serde_json::Error,
}

/// The notification sink refused or failed to show a notification.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification message is empty")]
    EmptyMessage,

    #[error("could not resolve image path {path}: {source}")]
    ImagePath {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to launch notifier: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("notifier exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}
