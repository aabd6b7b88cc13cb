//! Comment text normalization.
//!
//! Markup is stripped, the text is split into word tokens with English
//! contractions separated, stop words and punctuation are dropped, and the
//! remaining tokens are lemmatized and joined with single spaces.

mod lemma;
mod stopwords;

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use self::lemma::lemmatize;
use self::stopwords::is_stop_word;

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("valid markup regex"));

/// Clitics split off the end of a word token, longest first.
const CLITICS: &[&str] = &[
    "n't", "n\u{2019}t", "'ll", "\u{2019}ll", "'re", "\u{2019}re", "'ve", "\u{2019}ve", "'s",
    "\u{2019}s", "'m", "\u{2019}m", "'d", "\u{2019}d",
];

/// Both text forms derived from one raw comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedComment {
    /// Raw text with markup removed.
    pub cleaned_text: String,
    /// Lowercase lemmas joined by single spaces. Empty when every token was filtered.
    pub processed_text: String,
}

/// Removes every `<...>` span, matching the shortest span each time.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    MARKUP_RE.replace_all(text, "").into_owned()
}

/// Splits text on Unicode word boundaries, separating clitics. Combining
/// marks stay attached to their base character.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }
        let (head, clitic) = split_clitic(segment);
        if !head.is_empty() {
            tokens.push(head);
        }
        if let Some(clitic) = clitic {
            tokens.push(clitic);
        }
    }
    tokens
}

fn split_clitic(token: &str) -> (&str, Option<&str>) {
    for clitic in CLITICS {
        if token.len() > clitic.len() && ends_with_ignore_case(token, clitic) {
            let (head, tail) = token.split_at(token.len() - clitic.len());
            return (head, Some(tail));
        }
    }
    (token, None)
}

fn ends_with_ignore_case(token: &str, suffix: &str) -> bool {
    let at = token.len() - suffix.len();
    token.is_char_boundary(at) && token[at..].eq_ignore_ascii_case(suffix)
}

fn is_punctuation(token: &str) -> bool {
    static PUNCT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\p{P}+$").expect("valid punctuation regex"));
    PUNCT_RE.is_match(token)
}

/// Normalizes one raw comment.
#[must_use]
pub fn normalize_text(raw: &str) -> NormalizedComment {
    let cleaned_text = strip_markup(raw);
    let processed_text = tokenize(&cleaned_text)
        .into_iter()
        .filter(|token| !is_punctuation(token))
        .map(str::to_lowercase)
        .filter(|lower| !is_stop_word(lower))
        .map(|lower| lemmatize(&lower))
        .collect::<Vec<_>>()
        .join(" ");
    NormalizedComment {
        cleaned_text,
        processed_text,
    }
}
