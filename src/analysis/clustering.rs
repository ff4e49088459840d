//! Clustering Engine
//!
//! Greedy single-pass grouping of records by similarity to a seed.
//!
//! # Algorithm
//!
//! ```text
//! for each unassigned record (input order):
//!     open a cluster seeded at it
//!     add every other unassigned record with similarity(seed, r) >= threshold
//!     keep the cluster if it reached min_size, otherwise release its members
//! ```
//!
//! O(n²) similarity comparisons. Deterministic for a fixed input order.
//! Records that never land in a kept cluster are dropped from the output.

use crate::analysis::similarity::{JaccardSimilarity, Similarity};
use crate::memory::Record;
use serde::{Deserialize, Serialize};

/// Clustering parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
    /// Smallest cluster worth returning
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    /// Minimum similarity to the seed for membership
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_min_size() -> usize {
    3
}

fn default_threshold() -> f64 {
    0.7
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            threshold: default_threshold(),
        }
    }
}

/// A group of related records
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    /// Content of the seed record
    pub centroid: String,
    /// Members, seed first, then in input order
    pub members: Vec<Record>,
}

impl Cluster {
    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Identifiers of the members, in order
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Partitions record batches into similarity groups
#[derive(Debug, Clone, Default)]
pub struct ClusteringEngine<S = JaccardSimilarity> {
    similarity: S,
}

impl ClusteringEngine<JaccardSimilarity> {
    /// Create an engine using lexical similarity
    pub fn new() -> Self {
        Self {
            similarity: JaccardSimilarity,
        }
    }
}

impl<S: Similarity> ClusteringEngine<S> {
    /// Create an engine with a custom similarity measure
    pub fn with_similarity(similarity: S) -> Self {
        Self { similarity }
    }

    /// Cluster using a config
    pub fn cluster_with(&self, records: &[Record], config: &ClusterConfig) -> Vec<Cluster> {
        self.cluster(records, config.min_size, config.threshold)
    }

    /// Cluster a batch of records
    ///
    /// A `min_size` of 0 behaves like 1. `threshold` is clamped to [0, 1].
    pub fn cluster(&self, records: &[Record], min_size: usize, threshold: f64) -> Vec<Cluster> {
        if records.is_empty() {
            return Vec::new();
        }

        let min_size = min_size.max(1);
        let threshold = if threshold.is_nan() {
            1.0
        } else {
            threshold.clamp(0.0, 1.0)
        };

        let mut assigned = vec![false; records.len()];
        let mut clusters = Vec::new();

        for (seed_idx, seed) in records.iter().enumerate() {
            if assigned[seed_idx] {
                continue;
            }

            let mut members = vec![seed_idx];
            for (idx, candidate) in records.iter().enumerate() {
                if idx == seed_idx || assigned[idx] {
                    continue;
                }
                if self.similarity.similarity(&seed.content, &candidate.content) >= threshold {
                    members.push(idx);
                }
            }

            if members.len() < min_size {
                continue;
            }

            for &idx in &members {
                assigned[idx] = true;
            }

            clusters.push(Cluster {
                centroid: seed.content.clone(),
                members: members.into_iter().map(|idx| records[idx].clone()).collect(),
            });
        }

        tracing::debug!(
            records = records.len(),
            clusters = clusters.len(),
            min_size,
            threshold,
            "Clustered records"
        );

        clusters
    }
}
