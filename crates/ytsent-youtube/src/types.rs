//! Response types for the `commentThreads.list` endpoint.
//!
//! Only the fields the analyzer reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::Deserialize;
use ytsent_core::Comment;

/// One page of `commentThreads.list` results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadListResponse {
    /// Cursor for the next page. Absent (or empty) on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub struct TopLevelComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: Option<String>,
    #[serde(default)]
    pub text_display: Option<String>,
}

impl CommentThread {
    /// Flattens the thread into its top-level [`Comment`].
    ///
    /// Missing author or text fields become empty strings.
    #[must_use]
    pub fn into_comment(self) -> Comment {
        let snippet = self.snippet.top_level_comment.snippet;
        Comment::top_level(
            snippet.author_display_name.unwrap_or_default(),
            snippet.text_display.unwrap_or_default(),
        )
    }
}

/// Error envelope returned with non-2xx responses:
/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "..."}]}}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Reason codes from every error detail, in order.
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().filter_map(|e| e.reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_page_with_cursor() {
        let json = serde_json::json!({
            "kind": "youtube#commentThreadListResponse",
            "nextPageToken": "QURTSl9p",
            "items": [{
                "id": "Ugz",
                "snippet": {
                    "videoId": "dQw4w9WgXcQ",
                    "topLevelComment": {
                        "snippet": {
                            "authorDisplayName": "@viewer",
                            "textDisplay": "Never gonna give you up",
                            "likeCount": 3
                        }
                    },
                    "totalReplyCount": 0
                }
            }]
        });
        let page: CommentThreadListResponse = serde_json::from_value(json).expect("page");
        assert_eq!(page.next_page_token.as_deref(), Some("QURTSl9p"));
        let comment = page.items.into_iter().next().expect("item").into_comment();
        assert_eq!(comment.author, "@viewer");
        assert_eq!(comment.text, "Never gonna give you up");
        assert!(!comment.is_reply);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let json = serde_json::json!({
            "items": [{ "snippet": { "topLevelComment": { "snippet": {} } } }]
        });
        let page: CommentThreadListResponse = serde_json::from_value(json).expect("page");
        assert!(page.next_page_token.is_none());
        let comment = page.items.into_iter().next().expect("item").into_comment();
        assert_eq!(comment.author, "");
        assert_eq!(comment.text, "");
    }

    #[test]
    fn error_envelope_exposes_reasons() {
        let json = serde_json::json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{ "domain": "youtube.quota", "reason": "quotaExceeded" }]
            }
        });
        let env: ApiErrorEnvelope = serde_json::from_value(json).expect("envelope");
        assert_eq!(env.error.code, Some(403));
        assert_eq!(env.error.reasons().collect::<Vec<_>>(), vec!["quotaExceeded"]);
    }
}
