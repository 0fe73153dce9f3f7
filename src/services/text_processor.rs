// Text Processing Service
// Tokenization, n-gram expansion and simple text statistics

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Tokens are runs of two or more word characters; single letters and
/// punctuation are dropped.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token regex"))
}

/// Lowercase and split text into word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    let lowered = text.to_lowercase();
    token_re()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Expand tokens into contiguous n-grams for every n in `min_n..=max_n`.
/// Terms are space-joined, unigrams first.
pub fn ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let min_n = min_n.max(1);
    if tokens.is_empty() || max_n < min_n {
        return vec![];
    }

    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// Tokenize and expand in one step
pub fn extract_terms(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    ngrams(&tokens, ngram_range.0, ngram_range.1)
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters (not bytes)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Round to a fixed number of decimal places for API output
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextStats {
    pub text_length: usize,
    pub word_count: usize,
}

/// Length statistics reported next to every prediction
pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        text_length: char_count(text),
        word_count: word_count(text),
    }
}

/// Truncated single-line preview for log output
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}
