//! Comment sentiment pipeline.
//!
//! Strips markup from fetched comments, reduces them to lemmatized
//! stop-word-free text, encodes that text with a pretrained TF-IDF
//! vocabulary, scores it with a pretrained boosted-tree classifier, and
//! aggregates the per-comment labels into an [`AnalysisResult`].

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod vectorizer;

pub use aggregate::{round_half_even, summarize, TOP_COMMENT_LIMIT, TOP_COMMENT_MIN_CONFIDENCE};
pub use classifier::BoostedTreeClassifier;
pub use error::SentimentError;
pub use model::{ModelInfo, SentimentModel, TfidfXgbModel};
pub use normalize::{normalize_text, NormalizedComment};
pub use pipeline::{analyze_comments, Analyzer};
pub use source::CommentSource;
pub use types::{
    AnalysisResult, AnalyzedComment, Prediction, SentimentLabel, SentimentPercentages, TopComment,
};
pub use vectorizer::{SparseVector, TfidfVectorizer};
