//! Concept Evolution Tracker
//!
//! Reports how often a concept shows up in each time bucket, the mean
//! sentiment of the records mentioning it, and which other key concepts
//! appear alongside it.

use crate::analysis::analyzer::ContentAnalyzer;
use crate::memory::Record;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-bucket view of a concept
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvolutionReport {
    /// Mean sentiment of matching records, 0 when none matched
    pub sentiment: f64,
    /// Number of matching records
    pub frequency: usize,
    /// Key concepts of matching records
    pub related_concepts: BTreeSet<String>,
    /// Creation time of the earliest matching record
    pub first_seen: Option<DateTime<Utc>>,
    /// Creation time of the latest matching record
    pub last_seen: Option<DateTime<Utc>>,
}

impl EvolutionReport {
    /// Report for a bucket where nothing matched
    pub fn empty() -> Self {
        Self {
            sentiment: 0.0,
            frequency: 0,
            related_concepts: BTreeSet::new(),
            first_seen: None,
            last_seen: None,
        }
    }
}

/// Tracks a concept across bucketed record sets
#[derive(Debug, Clone, Default)]
pub struct ConceptEvolutionTracker {
    analyzer: ContentAnalyzer,
}

impl ConceptEvolutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that shares an existing analyzer
    pub fn with_analyzer(analyzer: ContentAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Track `concept` over every bucket
    ///
    /// Every input bucket appears in the output, matched or not.
    pub fn track<K>(
        &self,
        concept: &str,
        records_by_bucket: &BTreeMap<K, Vec<Record>>,
    ) -> BTreeMap<K, EvolutionReport>
    where
        K: Ord + Clone,
    {
        let needle = concept.to_lowercase();

        records_by_bucket
            .iter()
            .map(|(bucket, records)| (bucket.clone(), self.track_bucket(&needle, records)))
            .collect()
    }

    /// Report for one bucket; `needle` must already be case-folded
    fn track_bucket(&self, needle: &str, records: &[Record]) -> EvolutionReport {
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by_key(|r| r.created_at);

        let mut report = EvolutionReport::empty();
        let mut sentiments = Vec::new();

        for record in ordered {
            let content = record.content.to_lowercase();
            if !content.contains(needle) {
                continue;
            }

            report.frequency += 1;
            let analysis = self.analyzer.analyze_or_default(&content);
            sentiments.push(analysis.sentiment);
            report.related_concepts.extend(analysis.key_concepts);

            if report.first_seen.is_none() {
                report.first_seen = Some(record.created_at);
            }
            report.last_seen = Some(record.created_at);
        }

        if !sentiments.is_empty() {
            report.sentiment = sentiments.iter().sum::<f64>() / sentiments.len() as f64;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCategory;
    use chrono::Duration;

    fn record(id: &str, content: &str, created_at: DateTime<Utc>) -> Record {
        Record::new(id, content, MemoryCategory::TweetHistory).created_at(created_at)
    }

    #[test]
    fn test_empty_bucket_still_reported() {
        let now = Utc::now();
        let mut buckets = BTreeMap::new();
        buckets.insert("week1".to_string(), Vec::new());
        buckets.insert(
            "week2".to_string(),
            vec![record("1", "rocket launch today", now)],
        );

        let report = ConceptEvolutionTracker::new().track("launch", &buckets);

        assert_eq!(report.len(), 2);
        assert_eq!(report["week1"], EvolutionReport::empty());
        assert_eq!(report["week2"].frequency, 1);
        assert!(!report["week2"].related_concepts.is_empty());
        assert!(report["week2"].related_concepts.contains("rocket"));
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let now = Utc::now();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            "day",
            vec![
                record("1", "LAUNCHED the probe", now),
                record("2", "nothing here", now),
            ],
        );

        let report = ConceptEvolutionTracker::new().track("Launch", &buckets);

        assert_eq!(report["day"].frequency, 1);
    }

    #[test]
    fn test_mean_sentiment_and_seen_times() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        let mut buckets = BTreeMap::new();
        buckets.insert(
            "day",
            vec![
                // Out of order on purpose
                record("late", "launch was terrible", now),
                record("early", "launch was great", earlier),
            ],
        );

        let report = ConceptEvolutionTracker::new().track("launch", &buckets);
        let day = &report["day"];

        assert_eq!(day.frequency, 2);
        // +1/4 and -1/4 average out
        assert!(day.sentiment.abs() < 1e-9);
        assert_eq!(day.first_seen, Some(earlier));
        assert_eq!(day.last_seen, Some(now));
    }

    #[test]
    fn test_malformed_record_does_not_abort_bucket() {
        let now = Utc::now();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            "day",
            vec![record("blank", "", now), record("ok", "great launch", now)],
        );

        // An empty concept matches everything, including blank content
        let report = ConceptEvolutionTracker::new().track("", &buckets);

        assert_eq!(report["day"].frequency, 2);
        assert!(report["day"].sentiment > 0.0);
    }
}
