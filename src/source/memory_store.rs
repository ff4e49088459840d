//! In-Memory Record Store
//!
//! A process-local backend holding records in insertion order. Implements
//! both [`RecordSource`] and [`SemanticSearch`]; its "semantic" search
//! ranks by lexical similarity to the query.

use super::csv_import::import_records_csv;
use super::{RecordSource, SemanticSearch, SourceError, SourceResult};
use crate::analysis::similarity::{JaccardSimilarity, Similarity};
use crate::memory::{Record, RecordFilter, TimeRange};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;

/// Records held in memory behind an async lock
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Record>>,
    similarity: JaccardSimilarity,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with records
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
            similarity: JaccardSimilarity,
        }
    }

    /// Load records from a file, by extension: `.csv` or JSON otherwise
    pub fn load_path(path: &Path) -> SourceResult<Self> {
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Ok(Self::with_records(import_records_csv(path)?))
        } else {
            Self::load_json(path)
        }
    }

    /// Load records from a JSON array file
    ///
    /// Entries that are not objects are skipped with a warning.
    pub fn load_json(path: &Path) -> SourceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let records = parse_json_records(&content)?;
        tracing::info!(path = ?path, records = records.len(), "Loaded records");
        Ok(Self::with_records(records))
    }

    /// Insert a record, replacing any existing record with the same id
    pub async fn insert(&self, record: Record) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Insert several records
    pub async fn insert_batch(&self, batch: Vec<Record>) {
        for record in batch {
            self.insert(record).await;
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Parse a JSON array of records
///
/// Bad fields read as empty; only entries that are not objects are skipped.
pub fn parse_json_records(content: &str) -> SourceResult<Vec<Record>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;

    let mut records = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Record>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping malformed record");
            }
        }
    }

    Ok(records)
}

#[async_trait]
impl RecordSource for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_by_id(&self, id: &str) -> SourceResult<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn fetch_by_time_range(&self, range: TimeRange) -> SourceResult<Vec<Record>> {
        let records = self.records.read().await;
        let mut matching: Vec<Record> = records
            .iter()
            .filter(|r| range.contains_record(r))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        Ok(matching)
    }

    async fn query(&self, filter: &RecordFilter) -> SourceResult<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn store(&self, record: Record) -> SourceResult<()> {
        self.insert(record).await;
        Ok(())
    }
}

#[async_trait]
impl SemanticSearch for InMemoryStore {
    fn name(&self) -> &str {
        "memory-lexical"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&RecordFilter>,
    ) -> SourceResult<Vec<Record>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let records = self.records.read().await;
        let mut scored: Vec<(f64, &Record)> = records
            .iter()
            .filter(|r| filter.map(|f| f.matches(r)).unwrap_or(true))
            .map(|r| (self.similarity.similarity(query, &r.content), r))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable: equal scores stay in insertion order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl From<Vec<Record>> for InMemoryStore {
    fn from(records: Vec<Record>) -> Self {
        Self::with_records(records)
    }
}

impl TryFrom<&str> for InMemoryStore {
    type Error = SourceError;

    fn try_from(json: &str) -> Result<Self, Self::Error> {
        Ok(Self::with_records(parse_json_records(json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCategory;
    use chrono::{Duration, Utc};
    use std::io::Write;

    fn sample_store() -> InMemoryStore {
        let now = Utc::now();
        InMemoryStore::with_records(vec![
            Record::new("1", "rocket launch today", MemoryCategory::TweetHistory)
                .created_at(now - Duration::hours(1)),
            Record::new("2", "cats are great", MemoryCategory::ChatHistory)
                .created_at(now - Duration::days(3)),
            Record::new("3", "rocket engines roar", MemoryCategory::TweetHistory)
                .created_at(now - Duration::days(20))
                .meta("platform", "twitter"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let store = sample_store();
        assert_eq!(store.fetch_by_id("2").await.unwrap().unwrap().content, "cats are great");
        assert!(store.fetch_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_by_time_range_oldest_first() {
        let store = sample_store();

        let week = store.fetch_by_time_range(TimeRange::last_days(7)).await.unwrap();
        let ids: Vec<&str> = week.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let day = store.fetch_by_time_range(TimeRange::last_days(1)).await.unwrap();
        assert_eq!(day.len(), 1);
    }

    #[tokio::test]
    async fn test_query_filter() {
        let store = sample_store();

        let tweets = store
            .query(&RecordFilter::new().category(MemoryCategory::TweetHistory))
            .await
            .unwrap();
        assert_eq!(tweets.len(), 2);

        let tagged = store
            .query(&RecordFilter::new().meta("platform", "twitter"))
            .await
            .unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id, "3");
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = sample_store();

        let results = store.search("rocket launch", 10, None).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        // "cats are great" shares nothing and is dropped
        assert_eq!(ids, vec!["1", "3"]);

        let limited = store.search("rocket launch", 1, None).await.unwrap();
        assert_eq!(limited.len(), 1);

        let filtered = store
            .search(
                "rocket",
                10,
                Some(&RecordFilter::new().meta("platform", "twitter")),
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_replaces_same_id() {
        let store = InMemoryStore::new();
        store
            .insert(Record::new("a", "first", MemoryCategory::AgentState))
            .await;
        store
            .insert(Record::new("a", "second", MemoryCategory::AgentState))
            .await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.fetch_by_id("a").await.unwrap().unwrap().content, "second");
    }

    #[tokio::test]
    async fn test_store_through_trait() {
        let store = InMemoryStore::new();
        let source: &dyn RecordSource = &store;

        source
            .store(Record::new("n1", "fresh note", MemoryCategory::AgentState))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(source.fetch_by_id("n1").await.unwrap().unwrap().content, "fresh note");
    }

    #[test]
    fn test_parse_json_keeps_records_with_bad_fields() {
        let json = r#"[
            {"id": "a", "content": 42, "category": "chat_history"},
            {"id": "b", "content": "fine", "category": "not_a_category"},
            {"id": "c", "content": "ok"},
            7
        ]"#;

        let records = parse_json_records(json).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        // Only the entry that is not an object at all is skipped
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert_eq!(records[0].content, "");
        assert_eq!(records[0].category, MemoryCategory::ChatHistory);
        assert_eq!(records[1].content, "fine");
        assert_eq!(records[1].category, MemoryCategory::UserInteraction);
    }

    #[tokio::test]
    async fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"id": "m1", "content": "hello", "created_at": "2024-01-15T10:00:00Z"}}]"#
        )
        .unwrap();

        let store = InMemoryStore::load_path(file.path()).unwrap();
        assert_eq!(store.len().await, 1);
    }
}
