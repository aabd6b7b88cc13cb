use std::path::Path;

use serde::Serialize;

use crate::classifier::BoostedTreeClassifier;
use crate::error::SentimentError;
use crate::types::Prediction;
use crate::vectorizer::TfidfVectorizer;

/// Scores a batch of normalized texts.
///
/// Implementations are immutable after construction and shared across
/// requests; `predict` runs on a blocking thread.
pub trait SentimentModel: Send + Sync {
    /// Returns exactly one prediction per input text, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Model`] if scoring fails.
    fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>, SentimentError>;
}

/// Shape of the loaded artifacts, reported by the health endpoint and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub vocabulary_size: usize,
    pub trees: usize,
    pub features: usize,
}

/// TF-IDF encoder feeding a boosted-tree classifier.
#[derive(Debug, Clone)]
pub struct TfidfXgbModel {
    vectorizer: TfidfVectorizer,
    classifier: BoostedTreeClassifier,
}

impl TfidfXgbModel {
    /// Pairs an encoder with a classifier after checking their dimensions agree.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::DimensionMismatch`] if the encoder's output
    /// width differs from the classifier's feature count.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: BoostedTreeClassifier,
    ) -> Result<Self, SentimentError> {
        if vectorizer.n_features() != classifier.num_feature() {
            return Err(SentimentError::DimensionMismatch {
                vectorizer: vectorizer.n_features(),
                model: classifier.num_feature(),
            });
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Loads both artifacts from disk.
    ///
    /// # Errors
    ///
    /// Propagates artifact read, parse, and validation errors, plus
    /// [`SentimentError::DimensionMismatch`].
    pub fn load(
        vectorizer_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, SentimentError> {
        let vectorizer = TfidfVectorizer::load(vectorizer_path)?;
        let classifier = BoostedTreeClassifier::load(model_path)?;
        let model = Self::new(vectorizer, classifier)?;
        let info = model.info();
        tracing::info!(
            vocabulary_size = info.vocabulary_size,
            trees = info.trees,
            features = info.features,
            "sentiment artifacts loaded"
        );
        Ok(model)
    }

    #[must_use]
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            vocabulary_size: self.vectorizer.vocabulary_size(),
            trees: self.classifier.tree_count(),
            features: self.classifier.num_feature(),
        }
    }

    /// Scores a single normalized text.
    #[must_use]
    pub fn predict_one(&self, text: &str) -> Prediction {
        let row = self.vectorizer.transform(text);
        Prediction::from_positive_probability(self.classifier.predict_proba(&row))
    }
}

impl SentimentModel for TfidfXgbModel {
    fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>, SentimentError> {
        let predictions: Vec<Prediction> = texts.iter().map(|t| self.predict_one(t)).collect();
        if let Some(bad) = predictions.iter().find(|p| !p.confidence.is_finite()) {
            return Err(SentimentError::Model(format!(
                "classifier produced a non-finite confidence ({})",
                bad.confidence
            )));
        }
        Ok(predictions)
    }
}
