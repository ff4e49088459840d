//! Core data types for the memory model
//!
//! This module defines the fundamental types the engine consumes:
//! - `Record`: A single stored memory
//! - `MemoryCategory`: The fixed set of domain categories
//! - `TimeRange` and `Timeframe`: Time windows used to select records
//! - `RecordFilter`: Keyword and metadata constraints for queries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A single memory record
///
/// The canonical copy lives in an external backend. The engine receives
/// clones and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Opaque identifier, unique within a corpus
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Textual content (may be empty)
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    /// Domain category
    #[serde(
        default,
        alias = "type",
        alias = "memory_type",
        deserialize_with = "lenient_category"
    )]
    pub category: MemoryCategory,
    /// Free-form metadata
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Creation time
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

// A wrong-typed field reads as if it were absent.

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Null) | None => Ok(String::new()),
        Some(other) => {
            tracing::warn!(value = %other, "Expected a string field, treating it as empty");
            Ok(String::new())
        }
    }
}

fn lenient_category<'de, D>(deserializer: D) -> Result<MemoryCategory, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(name)) => Ok(name.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "Falling back to the default category");
            MemoryCategory::default()
        })),
        Some(serde_json::Value::Null) | None => Ok(MemoryCategory::default()),
        Some(other) => {
            tracing::warn!(value = %other, "Falling back to the default category");
            Ok(MemoryCategory::default())
        }
    }
}

fn lenient_metadata<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Object(map)) => Ok(map.into_iter().collect()),
        Some(serde_json::Value::Null) | None => Ok(HashMap::new()),
        Some(other) => {
            tracing::warn!(value = %other, "Expected a metadata object, treating it as empty");
            Ok(HashMap::new())
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        _ => None,
    };

    Ok(parsed.unwrap_or_else(|| {
        if let Some(other) = value.filter(|v| !v.is_null()) {
            tracing::warn!(value = %other, "Unreadable created_at, using the current time");
        }
        Utc::now()
    }))
}

impl Record {
    /// Create a new record stamped with the current time
    pub fn new(id: impl Into<String>, content: impl Into<String>, category: MemoryCategory) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            category,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder method: set creation time
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builder method: add a metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Creation time as Unix milliseconds
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Check if this record carries a specific metadata value
    pub fn has_meta(&self, key: &str, value: &serde_json::Value) -> bool {
        self.metadata.get(key).map(|v| v == value).unwrap_or(false)
    }
}

/// Category of a memory record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// Conversation turns
    ChatHistory,
    /// Generated or posted tweets
    TweetHistory,
    /// Trading strategy parameters
    TradingParams,
    /// Executed trades
    TradingHistory,
    /// User-authored prompt templates
    CustomPrompts,
    /// Snapshot of agent state
    AgentState,
    /// Generic user interaction
    #[default]
    UserInteraction,
    /// A stored associative chain
    MemoryChain,
    /// A stored cluster
    MemoryCluster,
}

impl MemoryCategory {
    /// Get all categories for iteration
    pub fn all() -> &'static [MemoryCategory] {
        &[
            MemoryCategory::ChatHistory,
            MemoryCategory::TweetHistory,
            MemoryCategory::TradingParams,
            MemoryCategory::TradingHistory,
            MemoryCategory::CustomPrompts,
            MemoryCategory::AgentState,
            MemoryCategory::UserInteraction,
            MemoryCategory::MemoryChain,
            MemoryCategory::MemoryCluster,
        ]
    }

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::ChatHistory => "chat_history",
            MemoryCategory::TweetHistory => "tweet_history",
            MemoryCategory::TradingParams => "trading_params",
            MemoryCategory::TradingHistory => "trading_history",
            MemoryCategory::CustomPrompts => "custom_prompts",
            MemoryCategory::AgentState => "agent_state",
            MemoryCategory::UserInteraction => "user_interaction",
            MemoryCategory::MemoryChain => "memory_chain",
            MemoryCategory::MemoryCluster => "memory_cluster",
        }
    }
}

impl std::fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MemoryCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown memory category: {}", s))
    }
}

/// Time range for record selection (half-open interval: [start, end))
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (exclusive), in milliseconds
    pub end: i64,
}

impl TimeRange {
    /// Create a time range, returning None if start >= end
    pub fn try_new(start: i64, end: i64) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Create a range covering `duration` back from `end`
    pub fn ending_at(end: DateTime<Utc>, duration: Duration) -> Self {
        let end = end.timestamp_millis();
        Self {
            start: end - duration.num_milliseconds(),
            // Inclusive of records stamped exactly at `end`
            end: end + 1,
        }
    }

    /// Create a range for the last N hours from now
    pub fn last_hours(hours: i64) -> Self {
        Self::ending_at(Utc::now(), Duration::hours(hours))
    }

    /// Create a range for the last N days from now
    pub fn last_days(days: i64) -> Self {
        Self::last_hours(days * 24)
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Check if a record was created within this range
    pub fn contains_record(&self, record: &Record) -> bool {
        self.contains(record.created_at_millis())
    }

    /// Get the duration in milliseconds
    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }
}

/// Named lookback window used for bucketing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
}

impl Timeframe {
    /// Buckets reported by concept evolution, shortest first
    pub fn all() -> &'static [Timeframe] {
        &[Timeframe::Day, Timeframe::Week, Timeframe::Month]
    }

    /// Length of the lookback window
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::Day => Duration::days(1),
            Timeframe::Week => Duration::weeks(1),
            Timeframe::Month => Duration::days(30),
        }
    }

    /// The window ending now
    pub fn range(&self) -> TimeRange {
        self.range_ending_at(Utc::now())
    }

    /// The window ending at `end`
    pub fn range_ending_at(&self, end: DateTime<Utc>) -> TimeRange {
        TimeRange::ending_at(end, self.duration())
    }

    /// Parse a timeframe name; anything unrecognised is a day
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "week" => Timeframe::Week,
            "month" => Timeframe::Month,
            _ => Timeframe::Day,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Day => write!(f, "day"),
            Timeframe::Week => write!(f, "week"),
            Timeframe::Month => write!(f, "month"),
        }
    }
}

/// Keyword and metadata filter for record queries
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Filter by category
    pub category: Option<MemoryCategory>,
    /// Required metadata values
    pub metadata: HashMap<String, serde_json::Value>,
    /// Case-insensitive substring of the content
    pub keyword: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: MemoryCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Check if a record matches this filter
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }

        for (key, value) in &self.metadata {
            if !record.has_meta(key, value) {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            if !record.content.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = Record::new("m1", "hello world", MemoryCategory::ChatHistory)
            .meta("platform", "twitter");

        assert_eq!(record.id, "m1");
        assert!(record.has_meta("platform", &serde_json::json!("twitter")));
        assert!(!record.has_meta("platform", &serde_json::json!("discord")));
    }

    #[test]
    fn test_record_lenient_deserialization() {
        let record: Record =
            serde_json::from_str(r#"{"id": "m1", "content": null, "type": "tweet_history"}"#)
                .unwrap();
        assert_eq!(record.content, "");
        assert_eq!(record.category, MemoryCategory::TweetHistory);
        assert!(record.metadata.is_empty());

        let record: Record = serde_json::from_str(r#"{"id": "m2"}"#).unwrap();
        assert_eq!(record.content, "");
        assert_eq!(record.category, MemoryCategory::UserInteraction);
    }

    #[test]
    fn test_bad_fields_read_as_empty() {
        let record: Record = serde_json::from_str(
            r#"{
                "id": "m1",
                "content": 42,
                "category": "not_a_category",
                "metadata": ["not", "a", "map"],
                "created_at": "last tuesday"
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, "m1");
        assert_eq!(record.content, "");
        assert_eq!(record.category, MemoryCategory::UserInteraction);
        assert!(record.metadata.is_empty());

        let record: Record =
            serde_json::from_str(r#"{"id": "m2", "created_at": 1705312800000}"#).unwrap();
        assert_eq!(record.created_at.timestamp_millis(), 1_705_312_800_000);
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in MemoryCategory::all() {
            let parsed: MemoryCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, *category);
        }
        assert!("nonsense".parse::<MemoryCategory>().is_err());
    }

    #[test]
    fn test_time_range_contains() {
        let range = TimeRange::try_new(1000, 2000).unwrap();

        assert!(!range.contains(999));
        assert!(range.contains(1000));
        assert!(range.contains(1999));
        assert!(!range.contains(2000));
        assert!(TimeRange::try_new(2000, 2000).is_none());
    }

    #[test]
    fn test_timeframe_windows() {
        let now = Utc::now();
        let week = Timeframe::Week.range_ending_at(now);

        assert!(week.contains(now.timestamp_millis()));
        assert!(week.contains((now - Duration::days(6)).timestamp_millis()));
        assert!(!week.contains((now - Duration::days(8)).timestamp_millis()));
        assert_eq!(Timeframe::from_name("month"), Timeframe::Month);
        assert_eq!(Timeframe::from_name("recent"), Timeframe::Day);
    }

    #[test]
    fn test_record_filter() {
        let record = Record::new("m1", "Rocket launch today", MemoryCategory::TweetHistory)
            .meta("platform", "twitter");

        assert!(RecordFilter::new().matches(&record));
        assert!(RecordFilter::new()
            .category(MemoryCategory::TweetHistory)
            .matches(&record));
        assert!(!RecordFilter::new()
            .category(MemoryCategory::ChatHistory)
            .matches(&record));
        assert!(RecordFilter::new().keyword("LAUNCH").matches(&record));
        assert!(!RecordFilter::new().keyword("landing").matches(&record));
        assert!(!RecordFilter::new().meta("platform", "discord").matches(&record));
    }
}
