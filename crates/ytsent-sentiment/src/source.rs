use async_trait::async_trait;
use ytsent_core::{Comment, VideoId};
use ytsent_youtube::YoutubeClient;

use crate::error::SentimentError;

/// Anything that can list the top-level comments of a video.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Returns the comments in source order, at most `max_comments` when set.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Source`] when the upstream fetch fails.
    async fn fetch_comments(
        &self,
        video_id: &VideoId,
        max_comments: Option<usize>,
    ) -> Result<Vec<Comment>, SentimentError>;
}

#[async_trait]
impl CommentSource for YoutubeClient {
    async fn fetch_comments(
        &self,
        video_id: &VideoId,
        max_comments: Option<usize>,
    ) -> Result<Vec<Comment>, SentimentError> {
        Ok(self.fetch_all_comments(video_id, max_comments).await?)
    }
}
