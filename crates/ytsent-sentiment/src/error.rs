use thiserror::Error;
use ytsent_youtube::YoutubeError;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// No video identifier could be extracted from the supplied link.
    #[error("could not extract a video id from link: {0}")]
    InvalidLink(String),

    #[error("comment fetch failed: {0}")]
    Source(#[from] YoutubeError),

    #[error("failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    ArtifactFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but its contents are unusable.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("vectorizer produces {vectorizer} features but the classifier expects {model}")]
    DimensionMismatch { vectorizer: usize, model: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("analysis exceeded the {secs}s deadline")]
    DeadlineExceeded { secs: u64 },

    #[error("analysis task failed: {0}")]
    Task(String),
}

impl SentimentError {
    /// `true` when the caller supplied bad input rather than the service failing.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidLink(_))
    }
}
