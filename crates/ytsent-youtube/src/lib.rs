//! Client for the `YouTube` Data API v3 comment-threads listing.
//!
//! Fetches every top-level comment for a video by following the API's
//! `nextPageToken` cursor, with bounded retries on transient failures.

mod client;
mod error;
mod retry;
mod types;

pub use client::{YoutubeClient, DEFAULT_BASE_URL, MAX_RESULTS_PER_PAGE};
pub use error::YoutubeError;
pub use types::{
    ApiErrorBody, ApiErrorDetail, ApiErrorEnvelope, CommentSnippet, CommentThread,
    CommentThreadListResponse, CommentThreadSnippet, TopLevelComment,
};
