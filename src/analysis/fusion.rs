//! Result Fusion
//!
//! Merges a primary (keyword/metadata filtered) candidate list with a
//! secondary (semantic) one into a single deduplicated ranking.
//!
//! Each source contributes a fixed weight per identifier it returns, and
//! contributions from both sources add up:
//!
//! | present in         | score |
//! |--------------------|-------|
//! | primary only       | 0.5   |
//! | secondary only     | 0.8   |
//! | both               | 1.3   |
//!
//! Ordering is by descending score. Equal scores keep first-seen order,
//! scanning the whole primary list before the secondary one.

use crate::memory::Record;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Anything fusion can deduplicate
pub trait Identified {
    /// Identifier, or None when the entry has none and must be skipped
    fn identifier(&self) -> Option<&str>;
}

impl Identified for Record {
    fn identifier(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(&self.id)
        }
    }
}

impl Identified for serde_json::Value {
    fn identifier(&self) -> Option<&str> {
        self.get("id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Per-source contribution to the fused score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FusionWeights {
    #[serde(default = "default_primary_weight")]
    pub primary: f64,
    #[serde(default = "default_secondary_weight")]
    pub secondary: f64,
}

fn default_primary_weight() -> f64 {
    0.5
}

fn default_secondary_weight() -> f64 {
    0.8
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            primary: default_primary_weight(),
            secondary: default_secondary_weight(),
        }
    }
}

/// One fused entry
#[derive(Debug, Clone, Serialize)]
pub struct FusedResult<T> {
    pub id: String,
    pub score: f64,
    /// The first copy of the item encountered
    pub item: T,
}

/// Two-source rank fusion
#[derive(Debug, Clone, Default)]
pub struct ResultFusion {
    weights: FusionWeights,
}

impl ResultFusion {
    /// Create a fusion stage with the default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fusion stage with custom weights
    pub fn with_weights(weights: FusionWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Fuse two ranked lists into one
    ///
    /// Entries without an identifier are skipped. An identifier repeated
    /// within one source still only earns that source's weight once.
    pub fn fuse<T: Identified + Clone>(
        &self,
        primary: &[T],
        secondary: &[T],
    ) -> Vec<FusedResult<T>> {
        let mut fused: Vec<FusedResult<T>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for (source, items, weight) in [
            (Source::Primary, primary, self.weights.primary),
            (Source::Secondary, secondary, self.weights.secondary),
        ] {
            let mut counted: HashSet<&str> = HashSet::new();

            for item in items {
                let Some(id) = item.identifier() else {
                    skipped += 1;
                    continue;
                };
                if !counted.insert(id) {
                    continue;
                }

                match positions.get(id).copied() {
                    Some(pos) => fused[pos].score += weight,
                    None => {
                        positions.insert(id.to_string(), fused.len());
                        fused.push(FusedResult {
                            id: id.to_string(),
                            score: weight,
                            item: item.clone(),
                        });
                    }
                }
            }

            tracing::trace!(?source, items = items.len(), "Fused source");
        }

        // Stable sort keeps first-seen order among equal scores
        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if skipped > 0 {
            tracing::debug!(skipped, "Skipped fusion entries without an id");
        }

        fused
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Primary,
    Secondary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlap_outranks_single_source() {
        let primary = vec![json!({"id": "a"})];
        let secondary = vec![json!({"id": "a"}), json!({"id": "b"})];

        let fused = ResultFusion::new().fuse(&primary, &secondary);

        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].id, "a");
        assert!((fused[0].score - 1.3).abs() < 1e-9);
        assert_eq!(fused[1].id, "b");
        assert!((fused[1].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_score_ordering_by_presence() {
        let primary = vec![json!({"id": "p"}), json!({"id": "both"})];
        let secondary = vec![json!({"id": "s"}), json!({"id": "both"})];

        let fused = ResultFusion::new().fuse(&primary, &secondary);
        let ids: Vec<&str> = fused.iter().map(|f| f.id.as_str()).collect();

        assert_eq!(ids, vec!["both", "s", "p"]);
        assert!(fused[0].score > fused[1].score);
        assert!(fused[1].score > fused[2].score);
    }

    #[test]
    fn test_missing_ids_are_skipped() {
        let primary = vec![json!({"content": "no id"}), json!({"id": ""}), json!({"id": 7})];
        let secondary = vec![json!({"id": "x"})];

        let fused = ResultFusion::new().fuse(&primary, &secondary);

        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].id, "x");
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let primary = vec![json!({"id": "c"}), json!({"id": "a"}), json!({"id": "b"})];

        let fused = ResultFusion::new().fuse(&primary, &[]);
        let ids: Vec<&str> = fused.iter().map(|f| f.id.as_str()).collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_repeated_id_within_source_counts_once() {
        let primary = vec![json!({"id": "a"}), json!({"id": "a"})];

        let fused = ResultFusion::new().fuse(&primary, &[]);

        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_primary_copy() {
        let primary = vec![json!({"id": "a", "from": "primary"})];
        let secondary = vec![json!({"id": "a", "from": "secondary"})];

        let fused = ResultFusion::new().fuse(&primary, &secondary);

        assert_eq!(fused[0].item["from"], "primary");
    }

    #[test]
    fn test_records_fuse() {
        use crate::memory::{MemoryCategory, Record};

        let primary = vec![Record::new("r1", "one", MemoryCategory::ChatHistory)];
        let secondary = vec![
            Record::new("", "anonymous", MemoryCategory::ChatHistory),
            Record::new("r1", "one", MemoryCategory::ChatHistory),
        ];

        let fused = ResultFusion::new().fuse(&primary, &secondary);

        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].item.content, "one");
    }
}
