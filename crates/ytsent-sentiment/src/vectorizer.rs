//! TF-IDF feature encoder loaded from a scikit-learn `TfidfVectorizer` export.
//!
//! The artifact is a JSON object carrying the fitted vocabulary and idf
//! weights together with the vectorizer parameters that affect `transform`.
//! Only the word analyzer is supported.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::SentimentError;

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Sorted `(feature index, value)` pairs with no explicit zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Value stored for `index`, or `None` when the feature is absent.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

#[allow(clippy::unnecessary_wraps)]
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_owned()
}

#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default)]
    binary: bool,
    #[serde(default = "default_true")]
    use_idf: bool,
    #[serde(default)]
    stop_words: Option<Vec<String>>,
    #[serde(default)]
    analyzer: Option<String>,
    #[serde(default)]
    strip_accents: Option<String>,
}

/// Frozen TF-IDF transform.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    min_n: usize,
    max_n: usize,
    lowercase: bool,
    sublinear_tf: bool,
    binary: bool,
    norm: Option<Norm>,
    token_re: Regex,
    stop_words: Vec<String>,
}

impl TfidfVectorizer {
    /// Reads and validates a vectorizer artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ArtifactIo`] if the file cannot be read,
    /// [`SentimentError::ArtifactFormat`] if it is not the expected JSON shape,
    /// and [`SentimentError::InvalidArtifact`] if its contents are inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SentimentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SentimentError::ArtifactIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// Parses a vectorizer artifact from an in-memory JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`TfidfVectorizer::load`], minus the I/O case.
    pub fn from_json(json: &str) -> Result<Self, SentimentError> {
        Self::parse(json, "<memory>")
    }

    fn parse(json: &str, origin: &str) -> Result<Self, SentimentError> {
        let artifact: VectorizerArtifact =
            serde_json::from_str(json).map_err(|source| SentimentError::ArtifactFormat {
                path: origin.to_owned(),
                source,
            })?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, SentimentError> {
        if let Some(analyzer) = artifact.analyzer.as_deref() {
            if analyzer != "word" {
                return Err(SentimentError::InvalidArtifact(format!(
                    "unsupported analyzer {analyzer:?}; only \"word\" is supported"
                )));
            }
        }
        if let Some(strip) = artifact.strip_accents {
            return Err(SentimentError::InvalidArtifact(format!(
                "strip_accents={strip:?} is not supported"
            )));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::InvalidArtifact(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }

        let n_features = artifact.vocabulary.len();
        if n_features == 0 {
            return Err(SentimentError::InvalidArtifact(
                "vocabulary is empty".to_owned(),
            ));
        }
        if let Some((term, &index)) = artifact.vocabulary.iter().find(|&(_, &i)| i >= n_features) {
            return Err(SentimentError::InvalidArtifact(format!(
                "vocabulary term {term:?} has index {index} outside 0..{n_features}"
            )));
        }

        let idf = if artifact.use_idf {
            if artifact.idf.len() != n_features {
                return Err(SentimentError::InvalidArtifact(format!(
                    "idf has {} weights for {n_features} vocabulary terms",
                    artifact.idf.len()
                )));
            }
            Some(artifact.idf)
        } else {
            None
        };

        let token_re = Regex::new(&artifact.token_pattern).map_err(|e| {
            SentimentError::InvalidArtifact(format!(
                "token_pattern {:?} does not compile: {e}",
                artifact.token_pattern
            ))
        })?;
        if token_re.captures_len() > 2 {
            return Err(SentimentError::InvalidArtifact(
                "token_pattern may contain at most one capturing group".to_owned(),
            ));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf,
            min_n,
            max_n,
            lowercase: artifact.lowercase,
            sublinear_tf: artifact.sublinear_tf,
            binary: artifact.binary,
            norm: artifact.norm,
            token_re,
            stop_words: artifact.stop_words.unwrap_or_default(),
        })
    }

    /// Dimension of every vector this encoder produces.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Encodes one document. Text with no in-vocabulary terms yields an empty vector.
    #[must_use]
    pub fn transform(&self, text: &str) -> SparseVector {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        let tokens = self.tokens(text);
        let mut counts: HashMap<usize, f64> = HashMap::new();
        self.for_each_ngram(&tokens, |term| {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        });

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| {
                let mut value = if self.binary { 1.0 } else { tf };
                if self.sublinear_tf {
                    value = 1.0 + value.ln();
                }
                if let Some(idf) = &self.idf {
                    value *= idf[index];
                }
                (index, value)
            })
            .filter(|&(_, v)| v != 0.0)
            .collect();
        entries.sort_unstable_by_key(|&(i, _)| i);

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|&(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 && (scale - 1.0).abs() > f64::EPSILON {
            for entry in &mut entries {
                entry.1 /= scale;
            }
        }

        SparseVector { entries }
    }

    fn tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let tokens: Vec<&str> = if self.token_re.captures_len() == 2 {
            self.token_re
                .captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_re.find_iter(text).map(|m| m.as_str()).collect()
        };
        if self.stop_words.is_empty() {
            tokens
        } else {
            tokens
                .into_iter()
                .filter(|t| !self.stop_words.iter().any(|s| s == t))
                .collect()
        }
    }

    fn for_each_ngram(&self, tokens: &[&str], mut visit: impl FnMut(&str)) {
        for n in self.min_n..=self.max_n.min(tokens.len()) {
            if n == 1 {
                tokens.iter().for_each(|t| visit(t));
            } else {
                for window in tokens.windows(n) {
                    visit(&window.join(" "));
                }
            }
        }
    }
}
