//! Video identifier extraction from user-supplied links.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Eleven URL-safe characters following `v=` or a path separator.
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("valid video id regex"));

/// A canonical 11-character video identifier.
///
/// Only the shape is checked; the video may not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the first video identifier found in `link`.
///
/// Matches the eleven characters drawn from `[0-9A-Za-z_-]` that immediately
/// follow `v=` or `/`. Returns `None` when no such run exists.
#[must_use]
pub fn extract_video_id(link: &str) -> Option<VideoId> {
    VIDEO_ID_RE
        .captures(link.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_owned()))
}
