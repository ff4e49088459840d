//! Memory Service
//!
//! Orchestrates the analysis engine over a record backend. The service is
//! built from its dependencies and holds no process-wide state:
//!
//! ```text
//! RecordSource ─┐
//!               ├─> MemoryService ─> analysis components
//! SemanticSearch┘
//! ```

use crate::analysis::codec;
use crate::analysis::{
    AnalysisEnvelope, AnalysisResult, Chain, ChainBuilder, ChainConfig, Cluster, ClusterConfig,
    ClusteringEngine, ConceptEvolutionTracker, ContentAnalyzer, EvolutionReport, FusedResult,
    ResultFusion,
};
use crate::config::EngineConfig;
use crate::memory::{MemoryCategory, Record, RecordFilter, Timeframe};
use crate::source::{RecordSource, SemanticSearch, SourceError};
use chrono::Utc;
use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Summary returned when a timeframe holds no records
pub const EMPTY_TIMEFRAME_SUMMARY: &str = "No memories found for the specified timeframe.";

/// Metadata key holding a record's encoded [`AnalysisEnvelope`]
pub const ANALYSIS_METADATA_KEY: &str = "analysis";

/// A record together with the analysis stored alongside it
#[derive(Debug, Clone, Serialize)]
pub struct MemoryDetail {
    pub record: Record,
    /// Decoded stored analysis; None when absent or unreadable
    pub analysis: Option<AnalysisResult>,
}

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Memory not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Record source error: {0}")]
    Source(#[from] SourceError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Memory intelligence over a record backend
pub struct MemoryService {
    records: Arc<dyn RecordSource>,
    semantic: Arc<dyn SemanticSearch>,
    config: EngineConfig,
    analyzer: ContentAnalyzer,
    clustering: ClusteringEngine,
    chains: ChainBuilder,
    fusion: ResultFusion,
    evolution: ConceptEvolutionTracker,
}

impl MemoryService {
    /// Create a new service
    pub fn new(
        records: Arc<dyn RecordSource>,
        semantic: Arc<dyn SemanticSearch>,
        config: EngineConfig,
    ) -> Self {
        let analyzer = ContentAnalyzer::new();

        Self {
            records,
            semantic,
            fusion: ResultFusion::with_weights(config.fusion),
            config,
            clustering: ClusteringEngine::new(),
            chains: ChainBuilder::new(),
            evolution: ConceptEvolutionTracker::with_analyzer(analyzer.clone()),
            analyzer,
        }
    }

    /// Engine defaults this service was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a piece of content; empty content yields the neutral result
    pub fn analyze(&self, content: &str) -> AnalysisResult {
        self.analyzer.analyze_or_default(content)
    }

    /// Analyze content and wrap the result for storage
    pub fn analyze_envelope(&self, record_id: &str, content: &str) -> AnalysisEnvelope {
        AnalysisEnvelope::new(record_id, self.analyze(content))
    }

    /// Analyze a record and save it with the encoded analysis in its metadata
    ///
    /// A record without an id is given a generated one.
    pub async fn store_memory(&self, mut record: Record) -> ServiceResult<Record> {
        if record.id.trim().is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }

        let envelope = self.analyze_envelope(&record.id, &record.content);
        let encoded = codec::encode(&envelope)
            .map_err(|e| ServiceError::Validation(format!("cannot encode analysis: {}", e)))?;
        record
            .metadata
            .insert(ANALYSIS_METADATA_KEY.to_string(), encoded.into());

        self.records.store(record.clone()).await?;
        tracing::debug!(id = %record.id, "Stored memory");

        Ok(record)
    }

    /// Get a single record by id, with its stored analysis
    pub async fn get_memory(&self, id: &str) -> ServiceResult<MemoryDetail> {
        let record = self.fetch_record(id).await?;
        let analysis = stored_analysis(&record);
        Ok(MemoryDetail { record, analysis })
    }

    async fn fetch_record(&self, id: &str) -> ServiceResult<Record> {
        if id.trim().is_empty() {
            return Err(ServiceError::Validation("memory id is empty".to_string()));
        }

        self.records
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Build an associative chain starting at record `id`
    ///
    /// Candidates come from semantic search on the seed's content, bounded
    /// to `depth * candidate_multiplier` records.
    pub async fn chain_memories(&self, id: &str, config: &ChainConfig) -> ServiceResult<Chain> {
        let seed = self.fetch_record(id).await?;

        let limit = config
            .depth
            .saturating_mul(self.config.candidate_multiplier);
        let candidates = if limit == 0 {
            Vec::new()
        } else {
            self.semantic.search(&seed.content, limit, None).await?
        };

        let chain = self.chains.build_chain_with(&seed, &candidates, config);

        tracing::debug!(
            seed = %id,
            candidates = candidates.len(),
            length = chain.len(),
            "Built memory chain"
        );

        Ok(chain)
    }

    /// Cluster the records of a timeframe
    pub async fn cluster_memories(
        &self,
        timeframe: Timeframe,
        config: &ClusterConfig,
    ) -> ServiceResult<Vec<Cluster>> {
        let records = self.records.fetch_by_time_range(timeframe.range()).await?;
        let clusters = self.clustering.cluster_with(&records, config);

        tracing::debug!(
            %timeframe,
            records = records.len(),
            clusters = clusters.len(),
            "Clustered memories"
        );

        Ok(clusters)
    }

    /// Track a concept over the day, week and month windows
    ///
    /// The three windows are fetched concurrently and all of them appear
    /// in the result, matched or not.
    pub async fn track_evolution(
        &self,
        concept: &str,
    ) -> ServiceResult<BTreeMap<Timeframe, EvolutionReport>> {
        let now = Utc::now();

        let fetches = Timeframe::all().iter().map(|timeframe| {
            let range = timeframe.range_ending_at(now);
            async move {
                let records = self.records.fetch_by_time_range(range).await?;
                Ok::<_, SourceError>((*timeframe, records))
            }
        });

        let buckets: BTreeMap<Timeframe, Vec<Record>> =
            try_join_all(fetches).await?.into_iter().collect();

        Ok(self.evolution.track(concept, &buckets))
    }

    /// Combined category/keyword and semantic query
    ///
    /// Both lookups run concurrently and are merged with [`ResultFusion`].
    pub async fn query_memories(
        &self,
        category: Option<MemoryCategory>,
        content: &str,
    ) -> ServiceResult<Vec<FusedResult<Record>>> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("query content is empty".to_string()));
        }

        let mut filter = RecordFilter::new().keyword(content);
        let mut semantic_filter = RecordFilter::new();
        if let Some(category) = category {
            filter = filter.category(category);
            semantic_filter = semantic_filter.category(category);
        }

        let (primary, secondary) = tokio::join!(
            self.records.query(&filter),
            self.semantic
                .search(content, self.config.semantic_limit, Some(&semantic_filter)),
        );
        let (primary, secondary) = (primary?, secondary?);

        let fused = self.fusion.fuse(&primary, &secondary);

        tracing::debug!(
            primary = primary.len(),
            secondary = secondary.len(),
            fused = fused.len(),
            "Fused query results"
        );

        Ok(fused)
    }

    /// Summarize the first `limit` records of a timeframe
    pub async fn summarize(&self, timeframe: Timeframe, limit: usize) -> ServiceResult<String> {
        let records = self.records.fetch_by_time_range(timeframe.range()).await?;

        if records.is_empty() || limit == 0 {
            return Ok(EMPTY_TIMEFRAME_SUMMARY.to_string());
        }

        let selected = &records[..limit.min(records.len())];
        Ok(self.analyzer.summarize_records(selected))
    }
}

/// Decode the analysis envelope kept in a record's metadata
fn stored_analysis(record: &Record) -> Option<AnalysisResult> {
    let value = record.metadata.get(ANALYSIS_METADATA_KEY)?;

    let Some(text) = value.as_str() else {
        tracing::warn!(id = %record.id, "Stored analysis is not a string, ignoring it");
        return None;
    };

    match codec::decode(text) {
        Ok(envelope) => Some(envelope.into_analysis()),
        Err(e) => {
            tracing::warn!(id = %record.id, error = %e, "Ignoring unreadable stored analysis");
            None
        }
    }
}
