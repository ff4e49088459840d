//! Text primitives shared by the analysis components
//!
//! Every component tokenizes the same way: case-fold, then split on
//! Unicode whitespace. Tokens keep their punctuation, so `"good!"` and
//! `"good"` are distinct tokens for similarity and concepts. Only the
//! sentiment lexicon lookup trims surrounding punctuation.

use std::collections::HashSet;

/// Words that push sentiment up
pub const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "positive", "amazing"];

/// Words that push sentiment down
pub const NEGATIVE_WORDS: &[&str] = &["bad", "poor", "negative", "terrible", "awful"];

/// Words never reported as key concepts
pub const STOPWORDS: &[&str] = &["the", "is", "at", "which", "on", "in", "a", "an", "and"];

/// Case-folded whitespace tokens, in order, duplicates kept
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Case-folded whitespace tokens as a set
pub fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// First `limit` distinct items, in first-seen order
pub fn distinct<'a, I>(items: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if out.len() >= limit {
            break;
        }
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    out
}

/// First `max_chars` characters, with `...` appended when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_case_folds() {
        assert_eq!(tokenize("  Hello   WORLD\tagain "), vec!["hello", "world", "again"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_tokens_keep_punctuation() {
        assert_eq!(tokenize("Good! good"), vec!["good!", "good"]);
        assert_eq!(token_set("Good! good").len(), 2);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let tokens = tokenize("b a b c a d");
        assert_eq!(distinct(&tokens, 3), vec!["b", "a", "c"]);
        assert_eq!(distinct(&tokens, 10), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
        assert_eq!(truncate_chars("ééé", 3), "ééé");
    }
}
