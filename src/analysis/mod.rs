//! Memory Analysis Engine
//!
//! Pure, synchronous components that turn batches of records into
//! analysis structures. None of them keep state between calls or mutate
//! their inputs, so they can be shared across tasks without locking.
//!
//! ## Components
//!
//! - **ContentAnalyzer**: sentiment, emotion, concepts, patterns, importance, summary
//! - **Similarity**: lexical (Jaccard) similarity between two texts
//! - **ClusteringEngine**: greedy grouping above a size/threshold policy
//! - **ChainBuilder**: greedy nearest-neighbour associative chains
//! - **ResultFusion**: two-source score fusion with deduplication
//! - **ConceptEvolutionTracker**: concept frequency and sentiment per time bucket
//! - **codec**: versioned envelope for persisting analyses
//!
//! ## Cost
//!
//! Clustering is O(n²) and chaining O(depth·n) similarity comparisons.
//! Callers bound the candidate set before invoking them.

pub mod analyzer;
pub mod chain;
pub mod clustering;
pub mod codec;
pub mod error;
pub mod evolution;
pub mod fusion;
pub mod similarity;
pub mod text;

pub use analyzer::{AnalysisResult, ContentAnalyzer, EmotionalContext, Pattern};
pub use chain::{Chain, ChainBuilder, ChainConfig};
pub use clustering::{Cluster, ClusterConfig, ClusteringEngine};
pub use codec::AnalysisEnvelope;
pub use error::{AnalysisError, CodecError};
pub use evolution::{ConceptEvolutionTracker, EvolutionReport};
pub use fusion::{FusedResult, FusionWeights, Identified, ResultFusion};
pub use similarity::{jaccard, JaccardSimilarity, Similarity};
