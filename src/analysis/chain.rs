//! Chain Builder
//!
//! Builds an associative chain by repeatedly stepping from the chain's tail
//! to its most similar unvisited candidate.
//!
//! Running out of qualifying candidates is a normal end state: the chain is
//! returned as far as it got.

use crate::analysis::similarity::{JaccardSimilarity, Similarity};
use crate::memory::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Chaining parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChainConfig {
    /// Maximum number of links after the seed
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Minimum similarity for a link (links always need some overlap)
    #[serde(default)]
    pub min_similarity: f64,
}

fn default_depth() -> usize {
    2
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            min_similarity: 0.0,
        }
    }
}

/// An ordered chain of records starting at a seed
///
/// Never contains the same identifier twice.
#[derive(Debug, Clone, Serialize)]
pub struct Chain {
    pub records: Vec<Record>,
}

impl Chain {
    /// The record the chain started from
    pub fn seed(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Number of records including the seed
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers in chain order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Greedy nearest-neighbour chain builder
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder<S = JaccardSimilarity> {
    similarity: S,
}

impl ChainBuilder<JaccardSimilarity> {
    /// Create a builder using lexical similarity
    pub fn new() -> Self {
        Self {
            similarity: JaccardSimilarity,
        }
    }
}

impl<S: Similarity> ChainBuilder<S> {
    /// Create a builder with a custom similarity measure
    pub fn with_similarity(similarity: S) -> Self {
        Self { similarity }
    }

    /// Build a chain of at most `depth + 1` records
    pub fn build_chain(&self, seed: &Record, candidates: &[Record], depth: usize) -> Chain {
        self.build_chain_with(
            seed,
            candidates,
            &ChainConfig {
                depth,
                ..ChainConfig::default()
            },
        )
    }

    /// Build a chain using a config
    pub fn build_chain_with(
        &self,
        seed: &Record,
        candidates: &[Record],
        config: &ChainConfig,
    ) -> Chain {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(seed.id.as_str());

        let mut records = vec![seed.clone()];
        let mut tail = seed;

        for step in 0..config.depth {
            let Some(next) = self.most_similar(tail, candidates, &visited, config.min_similarity)
            else {
                tracing::debug!(step, seed = %seed.id, "Chain ended early, no qualifying candidate");
                break;
            };

            visited.insert(next.id.as_str());
            records.push(next.clone());
            tail = next;
        }

        Chain { records }
    }

    /// Most similar unvisited candidate, first in input order on ties
    fn most_similar<'a>(
        &self,
        tail: &Record,
        candidates: &'a [Record],
        visited: &HashSet<&str>,
        min_similarity: f64,
    ) -> Option<&'a Record> {
        let mut best: Option<(&'a Record, f64)> = None;

        for candidate in candidates {
            if visited.contains(candidate.id.as_str()) {
                continue;
            }

            let score = self.similarity.similarity(&tail.content, &candidate.content);
            if score <= 0.0 || score < min_similarity {
                continue;
            }

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best.map(|(record, _)| record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCategory;

    fn record(id: &str, content: &str) -> Record {
        Record::new(id, content, MemoryCategory::UserInteraction)
    }

    #[test]
    fn test_chain_follows_tail() {
        let seed = record("s", "apples oranges");
        let candidates = vec![
            record("a", "oranges bananas"),
            record("b", "bananas cherries"),
            record("c", "cherries grapes"),
        ];

        let chain = ChainBuilder::new().build_chain(&seed, &candidates, 3);

        assert_eq!(chain.ids(), vec!["s", "a", "b", "c"]);
    }

    #[test]
    fn test_depth_zero_is_just_seed() {
        let seed = record("s", "anything");
        let chain = ChainBuilder::new().build_chain(&seed, &[record("a", "anything")], 0);
        assert_eq!(chain.ids(), vec!["s"]);
    }

    #[test]
    fn test_stops_early_without_candidates() {
        let seed = record("s", "alpha");
        let chain = ChainBuilder::new().build_chain(&seed, &[], 5);
        assert_eq!(chain.len(), 1);

        let chain = ChainBuilder::new().build_chain(&seed, &[record("x", "unrelated")], 5);
        assert_eq!(chain.ids(), vec!["s"]);
    }

    #[test]
    fn test_never_revisits() {
        let seed = record("s", "loop loop");
        let candidates = vec![
            record("s", "loop loop"),
            record("a", "loop"),
            record("a", "loop"),
            record("b", "loop again"),
        ];

        let chain = ChainBuilder::new().build_chain(&seed, &candidates, 10);

        assert!(chain.len() <= 11);
        let unique: HashSet<&str> = chain.ids().into_iter().collect();
        assert_eq!(unique.len(), chain.len());
        assert_eq!(chain.ids(), vec!["s", "a", "b"]);
    }

    #[test]
    fn test_ties_broken_by_input_order() {
        let seed = record("s", "red blue");
        let candidates = vec![record("first", "red"), record("second", "blue")];

        let chain = ChainBuilder::new().build_chain(&seed, &candidates, 1);

        assert_eq!(chain.ids(), vec!["s", "first"]);
    }

    #[test]
    fn test_min_similarity_cuts_weak_links() {
        let seed = record("s", "one two three four");
        let candidates = vec![record("weak", "one five six seven")];

        let config = ChainConfig {
            depth: 2,
            min_similarity: 0.5,
        };
        let chain = ChainBuilder::new().build_chain_with(&seed, &candidates, &config);

        assert_eq!(chain.ids(), vec!["s"]);
    }
}
