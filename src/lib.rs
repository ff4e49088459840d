//! # Memoria
//!
//! Memory intelligence engine - derives structure from collections of short
//! textual memories (chat turns, tweets, trading notes, agent state).
//!
//! ## Features
//!
//! - **Content analysis**: lexicon sentiment, key concepts, patterns, importance
//! - **Clustering**: greedy similarity grouping with a size/threshold policy
//! - **Chaining**: associative chains by greedy nearest neighbour
//! - **Result fusion**: merge keyword and semantic result lists into one ranking
//! - **Concept evolution**: how a concept's frequency and sentiment shift over time
//!
//! ## Modules
//!
//! - [`memory`]: Record data model
//! - [`analysis`]: The pure analysis engine
//! - [`source`]: Record backends (`RecordSource`, `SemanticSearch`)
//! - [`service`]: Orchestration over a backend
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memoria::{EngineConfig, InMemoryStore, MemoryService, Timeframe};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load records
//!     let store = Arc::new(InMemoryStore::load_path("memories.json".as_ref())?);
//!
//!     // Build the service over the store
//!     let service = MemoryService::new(store.clone(), store, EngineConfig::default());
//!
//!     // Group this week's memories
//!     let clusters = service
//!         .cluster_memories(Timeframe::Week, &service.config().cluster)
//!         .await?;
//!
//!     println!("Found {} clusters", clusters.len());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod memory;
pub mod service;
pub mod source;

// Re-export top-level types for convenience
pub use memory::{MemoryCategory, Record, RecordFilter, TimeRange, Timeframe};

pub use analysis::{
    AnalysisEnvelope, AnalysisError, AnalysisResult, Chain, ChainBuilder, ChainConfig, Cluster,
    ClusterConfig, ClusteringEngine, CodecError, ConceptEvolutionTracker, ContentAnalyzer,
    EmotionalContext, EvolutionReport, FusedResult, FusionWeights, Identified, JaccardSimilarity,
    Pattern, ResultFusion, Similarity,
};

pub use source::{
    CsvImportResult, InMemoryStore, RecordCsvImporter, RecordSource, SemanticSearch, SourceError,
    SourceResult,
};

pub use service::{MemoryDetail, MemoryService, ServiceError, ServiceResult};

pub use config::{Config, ConfigError, EngineConfig, LoggingConfig, StoreConfig};
