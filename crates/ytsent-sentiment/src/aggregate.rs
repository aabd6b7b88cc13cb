//! Reduces per-comment predictions to the response summary.

use crate::types::{
    AnalysisResult, AnalyzedComment, SentimentLabel, SentimentPercentages, TopComment,
};

/// Maximum entries in each top-comments list.
pub const TOP_COMMENT_LIMIT: usize = 5;

/// Comments at or below this confidence never appear in a top list.
pub const TOP_COMMENT_MIN_CONFIDENCE: f64 = 0.8;

/// Rounds to `decimals` places, sending exact halves to the even neighbour.
///
/// Rounding works on the exact binary value, so `0.15` (stored just below
/// the tie) rounds down to `0.1`.
#[must_use]
pub fn round_half_even(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_half_even(count as f64 / total as f64 * 100.0, 1)
}

fn top_comments(analyzed: &[AnalyzedComment], label: SentimentLabel) -> Vec<TopComment> {
    let mut candidates: Vec<&AnalyzedComment> = analyzed
        .iter()
        .filter(|c| c.label == label && c.confidence > TOP_COMMENT_MIN_CONFIDENCE)
        .collect();
    // Stable: equal confidences keep fetch order.
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates
        .into_iter()
        .take(TOP_COMMENT_LIMIT)
        .map(|c| TopComment {
            author: c.comment.author.clone(),
            text: c.comment.text.clone(),
            confidence: c.confidence,
        })
        .collect()
}

/// Builds the summary for one video. An empty slice yields zero counts,
/// `0.0` percentages, and empty top lists.
#[must_use]
pub fn summarize(analyzed: &[AnalyzedComment]) -> AnalysisResult {
    let total = analyzed.len();
    let positive = analyzed
        .iter()
        .filter(|c| c.label == SentimentLabel::Positive)
        .count();
    let negative = total - positive;

    AnalysisResult {
        total_comments: total,
        positive_comments: positive,
        negative_comments: negative,
        sentiment_percentages: SentimentPercentages {
            positive: percentage(positive, total),
            negative: percentage(negative, total),
        },
        top_5_positive_comments: top_comments(analyzed, SentimentLabel::Positive),
        top_5_negative_comments: top_comments(analyzed, SentimentLabel::Negative),
    }
}
