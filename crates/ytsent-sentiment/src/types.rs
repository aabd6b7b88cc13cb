use serde::{Deserialize, Serialize};
use ytsent_core::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Positive,
}

/// Classifier output for one comment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: SentimentLabel,
    /// Probability of the winning class, in `[0.5, 1.0]`.
    pub confidence: f64,
}

impl Prediction {
    /// Arg-max over `[1 - p, p]`. A tie goes to the negative class.
    #[must_use]
    pub fn from_positive_probability(p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        if p > 0.5 {
            Self {
                label: SentimentLabel::Positive,
                confidence: p,
            }
        } else {
            Self {
                label: SentimentLabel::Negative,
                confidence: 1.0 - p,
            }
        }
    }
}

/// A fetched comment after normalization and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedComment {
    pub comment: Comment,
    /// Raw text with markup removed.
    pub cleaned_text: String,
    /// Lemmatized tokens joined by single spaces. May be empty.
    pub processed_text: String,
    pub label: SentimentLabel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopComment {
    pub author: String,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub negative: f64,
}

/// Aggregate statistics returned for one analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_comments: usize,
    pub positive_comments: usize,
    pub negative_comments: usize,
    pub sentiment_percentages: SentimentPercentages,
    pub top_5_positive_comments: Vec<TopComment>,
    pub top_5_negative_comments: Vec<TopComment>,
}
