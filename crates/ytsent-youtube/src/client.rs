//! HTTP client for the `commentThreads.list` endpoint.
//!
//! Wraps `reqwest` with API key handling, error-envelope classification, and
//! cursor-following pagination. All-or-nothing: a failure on any page discards
//! the comments collected so far and returns the error.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use ytsent_core::{AppConfig, Comment, VideoId};

use crate::error::YoutubeError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorEnvelope, CommentThread, CommentThreadListResponse};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest page size `commentThreads.list` accepts.
pub const MAX_RESULTS_PER_PAGE: u32 = 100;

const DEFAULT_MAX_PAGES: usize = 200;

/// Reason codes the API uses for quota and rate exhaustion.
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

/// Client for the comment-threads listing API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    max_pages: usize,
}

impl std::fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Retries are disabled until configured with [`Self::with_retry_policy`].
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ytsent/0.1 (comment-sentiment)")
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replaces
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, YoutubeError> {
        Ok(Self::with_base_url(
            &config.google_api_key,
            config.request_timeout_secs,
            &config.youtube_base_url,
        )?
        .with_retry_policy(config.max_retries, config.retry_backoff_base_ms)
        .with_max_pages(config.max_pages))
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Caps the number of pages one fetch may request. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches every top-level comment for `video_id`, in API order.
    ///
    /// Follows `nextPageToken` until the API reports no further page. When
    /// `max_comments` is set, stops as soon as that many comments are held.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::PaginationLimit`] if more than `max_pages` pages are needed.
    /// - Any error from [`Self::fetch_comment_page`].
    pub async fn fetch_all_comments(
        &self,
        video_id: &VideoId,
        max_comments: Option<usize>,
    ) -> Result<Vec<Comment>, YoutubeError> {
        let mut comments: Vec<Comment> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(YoutubeError::PaginationLimit {
                    video_id: video_id.to_string(),
                    max_pages: self.max_pages,
                });
            }

            let CommentThreadListResponse {
                next_page_token,
                items,
            } = self
                .fetch_comment_page(video_id, page_token.as_deref())
                .await?;

            let fetched = items.len();
            comments.extend(items.into_iter().map(CommentThread::into_comment));
            tracing::debug!(
                video_id = %video_id,
                page = page_count,
                fetched,
                total = comments.len(),
                "fetched comment page"
            );

            if let Some(limit) = max_comments {
                if comments.len() >= limit {
                    comments.truncate(limit);
                    tracing::info!(
                        video_id = %video_id,
                        limit,
                        "comment cap reached; remaining pages skipped"
                    );
                    break;
                }
            }

            page_token = next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(comments)
    }

    /// Fetches one page of top-level comment threads, retrying transient errors.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] on quota or rate exhaustion.
    /// - [`YoutubeError::VideoNotFound`] / [`YoutubeError::CommentsDisabled`].
    /// - [`YoutubeError::Api`] / [`YoutubeError::UnexpectedStatus`] for other non-2xx statuses.
    /// - [`YoutubeError::Http`] on network failure after retries.
    /// - [`YoutubeError::Deserialize`] if the body does not match the expected shape.
    pub async fn fetch_comment_page(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, YoutubeError> {
        let url = self.comment_threads_url(video_id, page_token)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move { self.request_page(url, video_id).await }
        })
        .await
    }

    async fn request_page(
        &self,
        url: Url,
        video_id: &VideoId,
    ) -> Result<CommentThreadListResponse, YoutubeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status, &body, video_id));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: format!("commentThreads(videoId={video_id})"),
            source: e,
        })
    }

    /// Builds the page URL with properly percent-encoded query parameters.
    fn comment_threads_url(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
    ) -> Result<Url, YoutubeError> {
        let mut url =
            self.base_url
                .join("commentThreads")
                .map_err(|e| YoutubeError::InvalidBaseUrl {
                    base_url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("part", "snippet");
            pairs.append_pair("videoId", video_id.as_str());
            pairs.append_pair("textFormat", "plainText");
            pairs.append_pair("maxResults", &MAX_RESULTS_PER_PAGE.to_string());
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

/// Maps a non-2xx response onto a typed error using the API's error envelope.
fn classify_error(status: StatusCode, body: &str, video_id: &VideoId) -> YoutubeError {
    let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) else {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return YoutubeError::QuotaExceeded(format!("HTTP {status}"));
        }
        return YoutubeError::UnexpectedStatus {
            status: status.as_u16(),
            context: format!("commentThreads(videoId={video_id})"),
        };
    };

    let error = envelope.error;
    if let Some(reason) = error.reasons().find(|r| QUOTA_REASONS.contains(r)) {
        return YoutubeError::QuotaExceeded(reason.to_owned());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return YoutubeError::QuotaExceeded(error.message);
    }
    if error.reasons().any(|r| r == "videoNotFound") || status == StatusCode::NOT_FOUND {
        return YoutubeError::VideoNotFound(video_id.to_string());
    }
    if error.reasons().any(|r| r == "commentsDisabled") {
        return YoutubeError::CommentsDisabled(video_id.to_string());
    }

    YoutubeError::Api {
        status: status.as_u16(),
        message: error.message,
    }
}
