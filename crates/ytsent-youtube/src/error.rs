use thiserror::Error;

/// Errors returned by the comment API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Daily quota or request-rate limit exhausted for the API key.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("comments are disabled for video {0}")]
    CommentsDisabled(String),

    /// Any other error reported in the API's `error` envelope.
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Non-2xx status without a parseable error envelope.
    #[error("unexpected HTTP status {status} for {context}")]
    UnexpectedStatus { status: u16, context: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for video {video_id}: exceeded {max_pages} pages")]
    PaginationLimit { video_id: String, max_pages: usize },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl YoutubeError {
    /// `true` when the upstream refused service because of quota or rate limits.
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}
