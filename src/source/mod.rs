//! Record Sources
//!
//! The engine reads records through two narrow capabilities instead of a
//! concrete database client:
//!
//! - [`RecordSource`]: store, fetch by id, by time range, and by keyword/metadata filter
//! - [`SemanticSearch`]: ranked candidates for a free-text query
//!
//! Backends implement one or both. [`InMemoryStore`] implements both and is
//! what the CLI and tests use; remote backends plug in behind the same traits.

mod csv_import;
mod error;
mod memory_store;

pub use csv_import::{import_records_csv, CsvImportResult, RecordCsvImporter};
pub use error::{SourceError, SourceResult};
pub use memory_store::{parse_json_records, InMemoryStore};

use crate::memory::{Record, RecordFilter, TimeRange};
use async_trait::async_trait;

/// Read/query access to stored records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Backend name (e.g. "memory")
    fn name(&self) -> &str;

    /// Get a record by id
    async fn fetch_by_id(&self, id: &str) -> SourceResult<Option<Record>>;

    /// Records created within `range`, oldest first
    async fn fetch_by_time_range(&self, range: TimeRange) -> SourceResult<Vec<Record>>;

    /// Records matching a keyword/metadata filter
    async fn query(&self, filter: &RecordFilter) -> SourceResult<Vec<Record>>;

    /// Save a record, replacing any record with the same id
    async fn store(&self, record: Record) -> SourceResult<()>;
}

/// Ranked free-text search over records
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Up to `limit` records most related to `query`, best first
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&RecordFilter>,
    ) -> SourceResult<Vec<Record>>;
}
