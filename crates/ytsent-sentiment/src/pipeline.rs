//! End-to-end analysis for one video link.
//!
//! 1. Parse the link into a video id.
//! 2. Fetch every top-level comment from the [`CommentSource`].
//! 3. Normalize and score the batch on a blocking thread.
//! 4. Aggregate into an [`AnalysisResult`].
//!
//! The whole run is bounded by a deadline. Nothing is cached between runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ytsent_core::{extract_video_id, Comment, VideoId};

use crate::aggregate::summarize;
use crate::error::SentimentError;
use crate::model::SentimentModel;
use crate::normalize::normalize_text;
use crate::source::CommentSource;
use crate::types::{AnalysisResult, AnalyzedComment};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Normalizes and scores a batch of comments, preserving input order.
///
/// # Errors
///
/// Returns [`SentimentError::Model`] if the model fails or returns a
/// different number of predictions than there are comments.
pub fn analyze_comments(
    comments: Vec<Comment>,
    model: &dyn SentimentModel,
) -> Result<Vec<AnalyzedComment>, SentimentError> {
    let normalized: Vec<_> = comments.iter().map(|c| normalize_text(&c.text)).collect();
    let texts: Vec<String> = normalized
        .iter()
        .map(|n| n.processed_text.clone())
        .collect();
    let predictions = model.predict(&texts)?;
    if predictions.len() != comments.len() {
        return Err(SentimentError::Model(format!(
            "model returned {} predictions for {} comments",
            predictions.len(),
            comments.len()
        )));
    }

    Ok(comments
        .into_iter()
        .zip(normalized)
        .zip(predictions)
        .map(|((comment, normalized), prediction)| AnalyzedComment {
            comment,
            cleaned_text: normalized.cleaned_text,
            processed_text: normalized.processed_text,
            label: prediction.label,
            confidence: prediction.confidence,
        })
        .collect())
}

/// Shared, stateless analysis service.
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn CommentSource>,
    model: Arc<dyn SentimentModel>,
    max_comments: Option<usize>,
    deadline: Duration,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("max_comments", &self.max_comments)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    #[must_use]
    pub fn new(source: Arc<dyn CommentSource>, model: Arc<dyn SentimentModel>) -> Self {
        Self {
            source,
            model,
            max_comments: None,
            deadline: DEFAULT_DEADLINE,
        }
    }

    #[must_use]
    pub fn with_max_comments(mut self, max_comments: Option<usize>) -> Self {
        self.max_comments = max_comments;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Analyzes the video a link points to.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::InvalidLink`] if no video id can be extracted.
    /// - [`SentimentError::DeadlineExceeded`] if the run outlives the deadline.
    /// - Any error from [`Analyzer::analyze_video`].
    pub async fn analyze_link(&self, link: &str) -> Result<AnalysisResult, SentimentError> {
        let video_id =
            extract_video_id(link).ok_or_else(|| SentimentError::InvalidLink(link.to_owned()))?;
        tokio::time::timeout(self.deadline, self.analyze_video(&video_id))
            .await
            .map_err(|_| {
                tracing::warn!(
                    video_id = %video_id,
                    deadline_secs = self.deadline.as_secs(),
                    "analysis deadline exceeded"
                );
                SentimentError::DeadlineExceeded {
                    secs: self.deadline.as_secs(),
                }
            })?
    }

    /// Fetches, scores, and summarizes one video without a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Source`] on fetch failure,
    /// [`SentimentError::Model`] on scoring failure, and
    /// [`SentimentError::Task`] if the scoring thread panics.
    pub async fn analyze_video(
        &self,
        video_id: &VideoId,
    ) -> Result<AnalysisResult, SentimentError> {
        let started = Instant::now();
        let comments = self
            .source
            .fetch_comments(video_id, self.max_comments)
            .await?;
        let fetched = comments.len();

        let result = if comments.is_empty() {
            summarize(&[])
        } else {
            let model = Arc::clone(&self.model);
            let analyzed =
                tokio::task::spawn_blocking(move || analyze_comments(comments, model.as_ref()))
                    .await
                    .map_err(|e| SentimentError::Task(e.to_string()))??;
            summarize(&analyzed)
        };

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            video_id = %video_id,
            comments = fetched,
            positive = result.positive_comments,
            negative = result.negative_comments,
            elapsed_ms,
            "video analyzed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ytsent_youtube::YoutubeError;

    use super::*;
    use crate::types::{Prediction, SentimentLabel};

    struct FixedSource {
        comments: Vec<Comment>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(comments: Vec<Comment>) -> Self {
            Self {
                comments,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CommentSource for FixedSource {
        async fn fetch_comments(
            &self,
            _video_id: &VideoId,
            max_comments: Option<usize>,
        ) -> Result<Vec<Comment>, SentimentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = max_comments.unwrap_or(self.comments.len());
            Ok(self.comments.iter().take(n).cloned().collect())
        }
    }

    struct SlowSource;

    #[async_trait]
    impl CommentSource for SlowSource {
        async fn fetch_comments(
            &self,
            _video_id: &VideoId,
            _max_comments: Option<usize>,
        ) -> Result<Vec<Comment>, SentimentError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CommentSource for FailingSource {
        async fn fetch_comments(
            &self,
            video_id: &VideoId,
            _max_comments: Option<usize>,
        ) -> Result<Vec<Comment>, SentimentError> {
            Err(YoutubeError::VideoNotFound(video_id.to_string()).into())
        }
    }

    /// Positive with 0.9 when the text mentions "love", otherwise negative with 0.95.
    struct KeywordModel;

    impl SentimentModel for KeywordModel {
        fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>, SentimentError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.split(' ').any(|w| w == "love") {
                        Prediction::from_positive_probability(0.9)
                    } else {
                        Prediction::from_positive_probability(0.05)
                    }
                })
                .collect())
        }
    }

    struct ShortModel;

    impl SentimentModel for ShortModel {
        fn predict(&self, _texts: &[String]) -> Result<Vec<Prediction>, SentimentError> {
            Ok(Vec::new())
        }
    }

    const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn sample_comments() -> Vec<Comment> {
        vec![
            Comment::top_level("ann", "I <b>loved</b> this video"),
            Comment::top_level("bob", "Terrible audio."),
            Comment::top_level("cat", "love it"),
        ]
    }

    fn analyzer(source: Arc<dyn CommentSource>) -> Analyzer {
        Analyzer::new(source, Arc::new(KeywordModel))
    }

    #[tokio::test]
    async fn analyze_link_labels_and_summarizes() {
        let source = Arc::new(FixedSource::new(sample_comments()));
        let result = analyzer(source).analyze_link(LINK).await.unwrap();
        assert_eq!(result.total_comments, 3);
        assert_eq!(result.positive_comments, 2);
        assert_eq!(result.negative_comments, 1);
        assert_eq!(result.sentiment_percentages.positive, 66.7);
        assert_eq!(result.top_5_positive_comments[0].author, "ann");
        assert_eq!(
            result.top_5_positive_comments[0].text,
            "I <b>loved</b> this video"
        );
        assert_eq!(result.top_5_negative_comments[0].author, "bob");
    }

    #[tokio::test]
    async fn invalid_link_never_reaches_the_source() {
        let source = Arc::new(FixedSource::new(sample_comments()));
        let err = analyzer(source.clone())
            .analyze_link("not a link")
            .await
            .unwrap_err();
        assert!(matches!(err, SentimentError::InvalidLink(_)));
        assert!(err.is_client_error());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn video_without_comments_yields_empty_summary() {
        let result = analyzer(Arc::new(FixedSource::new(Vec::new())))
            .analyze_link(LINK)
            .await
            .unwrap();
        assert_eq!(result.total_comments, 0);
        assert_eq!(result.sentiment_percentages.positive, 0.0);
        assert_eq!(result.sentiment_percentages.negative, 0.0);
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        let err = analyzer(Arc::new(FailingSource))
            .analyze_link(LINK)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SentimentError::Source(YoutubeError::VideoNotFound(_))
        ));
    }

    #[tokio::test]
    async fn deadline_bounds_the_run() {
        let err = analyzer(Arc::new(SlowSource))
            .with_deadline(Duration::from_millis(50))
            .analyze_link(LINK)
            .await
            .unwrap_err();
        assert!(matches!(err, SentimentError::DeadlineExceeded { .. }));
    }

    #[tokio::test]
    async fn max_comments_is_forwarded_to_the_source() {
        let source = Arc::new(FixedSource::new(sample_comments()));
        let result = analyzer(source)
            .with_max_comments(Some(2))
            .analyze_link(LINK)
            .await
            .unwrap();
        assert_eq!(result.total_comments, 2);
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let a = analyzer(Arc::new(FixedSource::new(sample_comments())));
        let first = a.analyze_link(LINK).await.unwrap();
        let second = a.analyze_link(LINK).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn analyze_comments_keeps_order_and_text_forms() {
        let analyzed = analyze_comments(sample_comments(), &KeywordModel).unwrap();
        assert_eq!(analyzed.len(), 3);
        assert_eq!(analyzed[0].cleaned_text, "I loved this video");
        assert_eq!(analyzed[0].processed_text, "love video");
        assert_eq!(analyzed[0].label, SentimentLabel::Positive);
        assert_eq!(analyzed[1].comment.author, "bob");
    }

    #[test]
    fn prediction_count_mismatch_is_a_model_error() {
        let err = analyze_comments(sample_comments(), &ShortModel).unwrap_err();
        assert!(matches!(err, SentimentError::Model(_)));
    }
}
