use serde::{Deserialize, Serialize};

/// A top-level comment as returned by the comment API.
///
/// `text` is the raw display text and may still contain markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    /// Always `false`: threaded replies are never fetched.
    pub is_reply: bool,
}

impl Comment {
    #[must_use]
    pub fn top_level(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            is_reply: false,
        }
    }
}
