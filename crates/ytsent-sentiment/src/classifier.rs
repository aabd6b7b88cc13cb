//! Binary gradient-boosted tree classifier read from an XGBoost JSON model.
//!
//! Supports the `gbtree` booster with the `binary:logistic` objective and
//! numerical splits, which is what `XGBClassifier.save_model("*.json")`
//! writes for a two-class text model.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SentimentError;
use crate::vectorizer::SparseVector;

const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct ModelDocument {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    attributes: HashMap<String, String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: Objective,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    #[serde(default)]
    name: Option<String>,
    model: BoosterModel,
}

#[derive(Debug, Deserialize)]
struct BoosterModel {
    #[serde(default)]
    gbtree_model_param: Option<GbtreeModelParam>,
    trees: Vec<TreeDocument>,
}

#[derive(Debug, Deserialize)]
struct GbtreeModelParam {
    #[serde(default)]
    num_parallel_tree: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

/// XGBoost writes `default_left` as 0/1 integers in some versions and booleans in others.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Int(u8),
    Bool(bool),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Self::Int(v) => v != 0,
            Self::Bool(b) => b,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<u64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    /// `(left, right)` for split nodes, `None` for leaves.
    children: Option<(usize, usize)>,
    feature: usize,
    /// Split threshold, or the leaf value for leaves.
    value: f32,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_document(
        index: usize,
        doc: TreeDocument,
        num_feature: usize,
    ) -> Result<Self, SentimentError> {
        let n = doc.left_children.len();
        if n == 0 {
            return Err(invalid(index, "tree has no nodes"));
        }
        if [
            doc.right_children.len(),
            doc.split_indices.len(),
            doc.split_conditions.len(),
            doc.default_left.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(invalid(index, "per-node arrays have different lengths"));
        }
        if doc.split_type.iter().any(|&t| t != 0) {
            return Err(invalid(index, "categorical splits are not supported"));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (doc.left_children[i], doc.right_children[i]);
            let feature = usize::try_from(doc.split_indices[i]).unwrap_or(usize::MAX);
            let children = if left == LEAF && right == LEAF {
                None
            } else {
                if feature >= num_feature {
                    let reason = format!(
                        "node {i} splits on feature {feature} but the model has {num_feature}"
                    );
                    return Err(invalid(index, &reason));
                }
                let child = |c: i64| {
                    usize::try_from(c)
                        .ok()
                        .filter(|&c| c > i && c < n)
                        .ok_or_else(|| invalid(index, &format!("node {i} has bad child index {c}")))
                };
                Some((child(left)?, child(right)?))
            };
            nodes.push(Node {
                children,
                feature,
                value: doc.split_conditions[i],
                default_left: doc.default_left[i].is_set(),
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, row: &SparseVector) -> f32 {
        let mut i = 0;
        loop {
            let node = &self.nodes[i];
            let Some((left, right)) = node.children else {
                return node.value;
            };
            let go_left = match row.get(node.feature) {
                #[allow(clippy::cast_possible_truncation)]
                Some(v) => (v as f32) < node.value,
                None => node.default_left,
            };
            i = if go_left { left } else { right };
        }
    }
}

fn invalid(tree: usize, reason: &str) -> SentimentError {
    SentimentError::InvalidArtifact(format!("tree {tree}: {reason}"))
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, SentimentError> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|_| SentimentError::InvalidArtifact(format!("{name} {raw:?} is not a number")))
}

/// Frozen boosted-tree ensemble producing `P(positive)`.
#[derive(Debug, Clone)]
pub struct BoostedTreeClassifier {
    trees: Vec<Tree>,
    base_margin: f32,
    num_feature: usize,
}

impl BoostedTreeClassifier {
    /// Reads and validates an XGBoost JSON model from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ArtifactIo`] if the file cannot be read,
    /// [`SentimentError::ArtifactFormat`] if it is not an XGBoost JSON model,
    /// and [`SentimentError::InvalidArtifact`] if the objective, booster, or
    /// tree structure is unsupported or inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SentimentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SentimentError::ArtifactIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// Parses an XGBoost JSON model held in memory.
    ///
    /// # Errors
    ///
    /// Same as [`BoostedTreeClassifier::load`], minus the I/O case.
    pub fn from_json(json: &str) -> Result<Self, SentimentError> {
        Self::parse(json, "<memory>")
    }

    fn parse(json: &str, origin: &str) -> Result<Self, SentimentError> {
        let doc: ModelDocument =
            serde_json::from_str(json).map_err(|source| SentimentError::ArtifactFormat {
                path: origin.to_owned(),
                source,
            })?;
        Self::from_document(doc.learner)
    }

    fn from_document(learner: Learner) -> Result<Self, SentimentError> {
        if learner.objective.name != "binary:logistic" {
            return Err(SentimentError::InvalidArtifact(format!(
                "objective {:?} is not supported; expected \"binary:logistic\"",
                learner.objective.name
            )));
        }
        if let Some(name) = learner.gradient_booster.name.as_deref() {
            if name != "gbtree" {
                return Err(SentimentError::InvalidArtifact(format!(
                    "booster {name:?} is not supported; expected \"gbtree\""
                )));
            }
        }

        let base_score: f32 = parse_param("base_score", &learner.learner_model_param.base_score)?;
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(SentimentError::InvalidArtifact(format!(
                "base_score {base_score} is outside (0, 1)"
            )));
        }
        let num_feature: usize =
            parse_param("num_feature", &learner.learner_model_param.num_feature)?;

        let model = learner.gradient_booster.model;
        let mut tree_docs = model.trees;
        if tree_docs.is_empty() {
            return Err(SentimentError::InvalidArtifact(
                "model contains no trees".to_owned(),
            ));
        }

        // Early-stopped models predict with the trees up to the best round.
        if let Some(best) = learner.attributes.get("best_iteration") {
            let best: usize = parse_param("best_iteration", best)?;
            let per_round: usize = match model
                .gbtree_model_param
                .and_then(|p| p.num_parallel_tree)
            {
                Some(raw) => parse_param("num_parallel_tree", &raw)?,
                None => 1,
            };
            let keep = best.saturating_add(1).saturating_mul(per_round.max(1));
            tree_docs.truncate(keep);
        }

        let trees = tree_docs
            .into_iter()
            .enumerate()
            .map(|(i, doc)| Tree::from_document(i, doc, num_feature))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin: (base_score / (1.0 - base_score)).ln(),
            num_feature,
        })
    }

    /// Feature dimension the trees were trained on.
    #[must_use]
    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn margin_f32(&self, row: &SparseVector) -> f32 {
        self.trees
            .iter()
            .fold(self.base_margin, |acc, t| acc + t.leaf_value(row))
    }

    /// Raw additive score before the logistic link, accumulated in `f32`
    /// tree by tree.
    #[must_use]
    pub fn margin(&self, row: &SparseVector) -> f64 {
        f64::from(self.margin_f32(row))
    }

    /// Probability of the positive class, computed in `f32` and widened.
    #[must_use]
    pub fn predict_proba(&self, row: &SparseVector) -> f64 {
        let margin = self.margin_f32(row);
        f64::from(1.0_f32 / (1.0 + (-margin).exp()))
    }
}
