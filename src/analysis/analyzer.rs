//! Content Analyzer
//!
//! Turns raw memory text into a structured feature bundle: lexicon
//! sentiment, an emotional label, key concepts, surface patterns, an
//! importance score, associations and a truncated summary.
//!
//! Everything here is heuristic and deterministic. No model is consulted.

use crate::analysis::error::AnalysisError;
use crate::analysis::text::{
    distinct, tokenize, truncate_chars, NEGATIVE_WORDS, POSITIVE_WORDS, STOPWORDS,
};
use crate::memory::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of key concepts and associations reported
pub const MAX_CONCEPTS: usize = 5;

/// Characters kept by the summary before the ellipsis
pub const SUMMARY_CHARS: usize = 100;

/// Token count above which content is tagged `detailed`
const DETAILED_TOKEN_COUNT: usize = 20;

/// Content length (in characters) that earns the full length score
const FULL_LENGTH_CHARS: f64 = 1000.0;

/// Neutral importance used when content cannot be analyzed
const DEFAULT_IMPORTANCE: f64 = 0.5;

/// Emotional label derived from sentiment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalContext {
    Excited,
    Creative,
    Neutral,
    Contemplative,
    Chaotic,
}

impl EmotionalContext {
    /// Step function over sentiment. Exactly zero is neutral.
    pub fn from_sentiment(sentiment: f64) -> Self {
        if sentiment > 0.5 {
            EmotionalContext::Excited
        } else if sentiment > 0.0 {
            EmotionalContext::Creative
        } else if sentiment < -0.5 {
            EmotionalContext::Chaotic
        } else if sentiment < 0.0 {
            EmotionalContext::Contemplative
        } else {
            EmotionalContext::Neutral
        }
    }
}

impl std::fmt::Display for EmotionalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmotionalContext::Excited => write!(f, "excited"),
            EmotionalContext::Creative => write!(f, "creative"),
            EmotionalContext::Neutral => write!(f, "neutral"),
            EmotionalContext::Contemplative => write!(f, "contemplative"),
            EmotionalContext::Chaotic => write!(f, "chaotic"),
        }
    }
}

/// Surface pattern detected in content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Contains `?`
    Question,
    /// Contains `!`
    Exclamation,
    /// More than 20 tokens
    Detailed,
}

/// Feature bundle produced for one piece of content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// Lexicon sentiment, 0 is neutral
    pub sentiment: f64,
    /// Label derived from `sentiment`
    pub emotional_context: EmotionalContext,
    /// Up to 5 distinct non-stopword tokens longer than 3 characters
    pub key_concepts: Vec<String>,
    /// Detected surface patterns
    pub patterns: Vec<Pattern>,
    /// Importance in [0, 1]
    pub importance: f64,
    /// Up to 5 distinct tokens, unfiltered
    pub associations: Vec<String>,
    /// Content truncated to 100 characters
    pub summary: String,
}

impl AnalysisResult {
    /// The result substituted when content cannot be analyzed
    pub fn neutral() -> Self {
        Self {
            sentiment: 0.0,
            emotional_context: EmotionalContext::Neutral,
            key_concepts: Vec::new(),
            patterns: Vec::new(),
            importance: DEFAULT_IMPORTANCE,
            associations: Vec::new(),
            summary: String::new(),
        }
    }

    /// Check whether a pattern was detected
    pub fn has_pattern(&self, pattern: Pattern) -> bool {
        self.patterns.contains(&pattern)
    }
}

/// Heuristic content analyzer
///
/// Holds only its fixed lexicons, so a single instance can be shared
/// freely across tasks.
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    stopwords: HashSet<&'static str>,
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentAnalyzer {
    /// Create an analyzer with the built-in lexicons
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Analyze a piece of content
    ///
    /// Fails with `InvalidInput` on empty content. Callers that must not
    /// fail should use [`ContentAnalyzer::analyze_or_default`].
    pub fn analyze(&self, content: &str) -> Result<AnalysisResult, AnalysisError> {
        if content.is_empty() {
            return Err(AnalysisError::InvalidInput("content is empty".to_string()));
        }

        let tokens = tokenize(content);
        let sentiment = self.score_tokens(&tokens);

        Ok(AnalysisResult {
            sentiment,
            emotional_context: EmotionalContext::from_sentiment(sentiment),
            key_concepts: self.concepts_from_tokens(&tokens),
            patterns: patterns(content, tokens.len()),
            importance: importance(content, &tokens),
            associations: distinct(&tokens, MAX_CONCEPTS),
            summary: truncate_chars(content, SUMMARY_CHARS),
        })
    }

    /// Analyze content, substituting the neutral result on invalid input
    pub fn analyze_or_default(&self, content: &str) -> AnalysisResult {
        match self.analyze(content) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to neutral analysis");
                AnalysisResult::neutral()
            }
        }
    }

    /// Lexicon sentiment of a piece of text
    ///
    /// `(positive - negative) / (tokens + 1)`. Surrounding punctuation is
    /// ignored when looking a token up, so `"excellent!"` still counts.
    pub fn sentiment(&self, text: &str) -> f64 {
        self.score_tokens(&tokenize(text))
    }

    /// Key concepts of a piece of text
    pub fn key_concepts(&self, text: &str) -> Vec<String> {
        self.concepts_from_tokens(&tokenize(text))
    }

    /// Summarize a batch of records as one truncated string
    pub fn summarize_records(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return "No memories to summarize".to_string();
        }

        let combined = records
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        truncate_chars(&combined, SUMMARY_CHARS)
    }

    fn score_tokens(&self, tokens: &[String]) -> f64 {
        let mut score: i64 = 0;
        for token in tokens {
            let word = token.trim_matches(|c: char| !c.is_alphanumeric());
            if self.positive.contains(word) {
                score += 1;
            } else if self.negative.contains(word) {
                score -= 1;
            }
        }
        score as f64 / (tokens.len() as f64 + 1.0)
    }

    fn concepts_from_tokens(&self, tokens: &[String]) -> Vec<String> {
        let candidates: Vec<&String> = tokens
            .iter()
            .filter(|t| t.chars().count() > 3 && !self.stopwords.contains(t.as_str()))
            .collect();
        distinct(candidates, MAX_CONCEPTS)
    }
}

fn patterns(content: &str, token_count: usize) -> Vec<Pattern> {
    let mut found = Vec::new();
    if content.contains('?') {
        found.push(Pattern::Question);
    }
    if content.contains('!') {
        found.push(Pattern::Exclamation);
    }
    if token_count > DETAILED_TOKEN_COUNT {
        found.push(Pattern::Detailed);
    }
    found
}

/// Mean of a length score and a lexical-diversity score
fn importance(content: &str, tokens: &[String]) -> f64 {
    let length_score = (content.chars().count() as f64 / FULL_LENGTH_CHARS).min(1.0);

    let diversity_score = if tokens.is_empty() {
        0.0
    } else {
        let unique: HashSet<&String> = tokens.iter().collect();
        unique.len() as f64 / tokens.len() as f64
    };

    (length_score + diversity_score) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCategory;

    #[test]
    fn test_question_and_exclamation_are_positive() {
        let analyzer = ContentAnalyzer::new();
        let result = analyzer.analyze("Is this good? It is truly excellent!").unwrap();

        assert!(result.has_pattern(Pattern::Question));
        assert!(result.has_pattern(Pattern::Exclamation));
        assert!(!result.has_pattern(Pattern::Detailed));
        assert!(result.sentiment > 0.0);
        assert!(matches!(
            result.emotional_context,
            EmotionalContext::Excited | EmotionalContext::Creative
        ));
    }

    #[test]
    fn test_empty_content_is_invalid() {
        let analyzer = ContentAnalyzer::new();
        assert!(matches!(
            analyzer.analyze(""),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert_eq!(analyzer.analyze_or_default(""), AnalysisResult::neutral());
    }

    #[test]
    fn test_neutral_defaults() {
        let neutral = AnalysisResult::neutral();
        assert_eq!(neutral.sentiment, 0.0);
        assert_eq!(neutral.emotional_context, EmotionalContext::Neutral);
        assert_eq!(neutral.importance, 0.5);
        assert!(neutral.key_concepts.is_empty());
        assert!(neutral.summary.is_empty());
    }

    #[test]
    fn test_sentiment_normalization() {
        let analyzer = ContentAnalyzer::new();
        // 1 positive over 3 tokens: 1 / 4
        assert!((analyzer.sentiment("a great day") - 0.25).abs() < 1e-9);
        // 2 negative over 2 tokens: -2 / 3
        assert!((analyzer.sentiment("terrible awful") + 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(analyzer.sentiment(""), 0.0);
        assert_eq!(analyzer.sentiment("GREAT"), 0.5);
    }

    #[test]
    fn test_emotional_context_steps() {
        assert_eq!(EmotionalContext::from_sentiment(0.6), EmotionalContext::Excited);
        assert_eq!(EmotionalContext::from_sentiment(0.5), EmotionalContext::Creative);
        assert_eq!(EmotionalContext::from_sentiment(0.0), EmotionalContext::Neutral);
        assert_eq!(EmotionalContext::from_sentiment(-0.5), EmotionalContext::Contemplative);
        assert_eq!(EmotionalContext::from_sentiment(-0.51), EmotionalContext::Chaotic);
    }

    #[test]
    fn test_key_concepts_filter_and_cap() {
        let analyzer = ContentAnalyzer::new();
        let concepts = analyzer.key_concepts(
            "The rocket and the rocket launch which went into orbit beyond mars yesterday",
        );

        // "the", "and" and "which" are stopwords; "mars" falls past the cap
        assert_eq!(concepts, vec!["rocket", "launch", "went", "into", "orbit"]);
    }

    #[test]
    fn test_associations_are_unfiltered() {
        let analyzer = ContentAnalyzer::new();
        let result = analyzer.analyze("A cat and a dog").unwrap();
        assert_eq!(result.associations, vec!["a", "cat", "and", "dog"]);
        assert!(result.key_concepts.is_empty());
    }

    #[test]
    fn test_detailed_pattern() {
        let analyzer = ContentAnalyzer::new();
        let long = vec!["word"; 21].join(" ");
        let result = analyzer.analyze(&long).unwrap();
        assert_eq!(result.patterns, vec![Pattern::Detailed]);

        let twenty = vec!["word"; 20].join(" ");
        assert!(analyzer.analyze(&twenty).unwrap().patterns.is_empty());
    }

    #[test]
    fn test_importance() {
        let analyzer = ContentAnalyzer::new();
        let result = analyzer.analyze("a a b b").unwrap();
        // length 7/1000, diversity 2/4
        assert!((result.importance - (0.007 + 0.5) / 2.0).abs() < 1e-9);

        let whitespace = analyzer.analyze("   ").unwrap();
        assert!((whitespace.importance - 0.0015).abs() < 1e-9);

        let long = "x".repeat(5000);
        assert_eq!(analyzer.analyze(&long).unwrap().importance, 1.0);
    }

    #[test]
    fn test_summary_truncation() {
        let analyzer = ContentAnalyzer::new();
        let exact = "y".repeat(100);
        assert_eq!(analyzer.analyze(&exact).unwrap().summary, exact);

        let long = "z".repeat(150);
        let summary = analyzer.analyze(&long).unwrap().summary;
        assert_eq!(summary, format!("{}...", "z".repeat(100)));
    }

    #[test]
    fn test_summarize_records() {
        let analyzer = ContentAnalyzer::new();
        assert_eq!(analyzer.summarize_records(&[]), "No memories to summarize");

        let records = vec![
            Record::new("1", "first thought", MemoryCategory::ChatHistory),
            Record::new("2", "second thought", MemoryCategory::ChatHistory),
        ];
        assert_eq!(
            analyzer.summarize_records(&records),
            "first thought second thought"
        );
    }

    #[test]
    fn test_result_serializes_lowercase_labels() {
        let analyzer = ContentAnalyzer::new();
        let result = analyzer.analyze("what?").unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"emotional_context\":\"neutral\""));
        assert!(json.contains("\"patterns\":[\"question\"]"));
    }
}
