use thiserror::Error;

/// Failure to retrieve the raw feed payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Feed request timed out")]
    Timeout,

    #[error("Failed to reach feed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Feed responded with status {status}")]
    Status { status: u16 },

    #[error("Failed to read feed body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The feed payload cannot be turned into a ranked batch.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `position` is the 1-based position of the entry in the feed.
    #[error("Malformed feed entry at position {position}: {reason}")]
    MalformedEntry { position: usize, reason: String },

    #[error("Malformed feed: {0}")]
    Malformed(String),
}

impl FeedError {
    pub(crate) fn entry(position: usize, reason: impl Into<String>) -> Self {
        FeedError::MalformedEntry {
            position,
            reason: reason.into(),
        }
    }
}
