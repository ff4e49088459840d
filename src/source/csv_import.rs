//! CSV Import
//!
//! Loads memory records from CSV files.
//! Columns are detected from the header row (`id`, `content`, `category`,
//! `created_at`); any other column is kept as string metadata. An
//! unreadable category or timestamp falls back to the default instead of
//! failing the row.

use super::{SourceError, SourceResult};
use crate::memory::{MemoryCategory, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Cap on the number of row errors kept in a result
const MAX_REPORTED_ERRORS: usize = 100;

/// Column positions within a row
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    id: Option<usize>,
    content: Option<usize>,
    category: Option<usize>,
    created_at: Option<usize>,
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = ColumnMap::default();

        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim().to_lowercase();

            match name.as_str() {
                "id" | "memory_id" => map.id = Some(idx),
                "content" | "text" | "body" => map.content = Some(idx),
                "category" | "type" | "memory_type" => map.category = Some(idx),
                "created_at" | "timestamp" | "date" | "time" => map.created_at = Some(idx),
                _ => map.extras.push((idx, name.replace(' ', "_"))),
            }
        }

        map
    }
}

/// CSV record importer with header auto-detection
#[derive(Debug, Clone)]
pub struct RecordCsvImporter {
    /// Explicit column layout; detected from the header when None
    columns: Option<ColumnMap>,
    /// Whether the CSV has a header row
    has_header: bool,
    /// Category for rows without one
    default_category: MemoryCategory,
    /// Extra format tried before the built-in ones
    timestamp_format: Option<String>,
}

/// Result of a CSV import operation
#[derive(Debug)]
pub struct CsvImportResult {
    pub records: Vec<Record>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl Default for RecordCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCsvImporter {
    /// Create an importer that reads the layout from the header row
    pub fn new() -> Self {
        Self {
            columns: None,
            has_header: true,
            default_category: MemoryCategory::default(),
            timestamp_format: None,
        }
    }

    /// Set whether the CSV has a header row
    ///
    /// Headerless input needs at least [`with_content_column`](Self::with_content_column).
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the content column index
    pub fn with_content_column(mut self, column: usize) -> Self {
        self.columns.get_or_insert_with(ColumnMap::default).content = Some(column);
        self
    }

    /// Set the id column index
    pub fn with_id_column(mut self, column: usize) -> Self {
        self.columns.get_or_insert_with(ColumnMap::default).id = Some(column);
        self
    }

    /// Set the category column index
    pub fn with_category_column(mut self, column: usize) -> Self {
        self.columns.get_or_insert_with(ColumnMap::default).category = Some(column);
        self
    }

    /// Set the timestamp column index
    pub fn with_timestamp_column(mut self, column: usize) -> Self {
        self.columns.get_or_insert_with(ColumnMap::default).created_at = Some(column);
        self
    }

    /// Set the category used when a row has none or an unknown one
    pub fn with_default_category(mut self, category: MemoryCategory) -> Self {
        self.default_category = category;
        self
    }

    /// Set a timestamp format string tried first
    pub fn with_timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = Some(format.to_string());
        self
    }

    /// Import records from a CSV file
    pub fn import(&self, path: &Path) -> SourceResult<CsvImportResult> {
        let reader = self.reader_builder().from_path(path)?;
        let result = self.import_reader(reader)?;

        tracing::info!(
            path = ?path,
            imported = result.rows_processed,
            failed = result.rows_failed,
            "CSV import complete"
        );

        Ok(result)
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> SourceResult<CsvImportResult> {
        let reader = self.reader_builder().from_reader(csv_data.as_bytes());
        self.import_reader(reader)
    }

    fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(self.has_header).flexible(true);
        builder
    }

    fn import_reader<R: Read>(&self, mut reader: csv::Reader<R>) -> SourceResult<CsvImportResult> {
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None if self.has_header => ColumnMap::from_headers(reader.headers()?),
            None => ColumnMap::default(),
        };

        let Some(content_column) = columns.content else {
            return Err(SourceError::Parse("CSV has no content column".to_string()));
        };

        let mut records = Vec::new();
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = if self.has_header {
                line_num + 2
            } else {
                line_num + 1
            };

            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                    continue;
                }
            };

            match self.parse_row(&row, &columns, content_column, actual_line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(CsvImportResult {
            rows_processed: records.len(),
            records,
            rows_failed,
            errors,
        })
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        columns: &ColumnMap,
        content_column: usize,
        line: usize,
    ) -> SourceResult<Record> {
        let field = |column: Option<usize>| {
            column
                .and_then(|idx| row.get(idx))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let content = row
            .get(content_column)
            .ok_or_else(|| SourceError::Parse("missing content column".to_string()))?;

        let id = field(columns.id)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // Unreadable category or timestamp fields read as empty
        let category = match field(columns.category).map(str::parse::<MemoryCategory>) {
            Some(Ok(category)) => category,
            Some(Err(e)) => {
                tracing::warn!(line, error = %e, "Using the default category");
                self.default_category
            }
            None => self.default_category,
        };

        let mut record = Record::new(id, content, category);

        if let Some(ts) = field(columns.created_at) {
            match self.parse_timestamp(ts) {
                Ok(created_at) => record.created_at = created_at,
                Err(e) => tracing::warn!(line, error = %e, "Using the import time"),
            }
        }

        for (idx, name) in &columns.extras {
            if let Some(value) = row.get(*idx).map(str::trim).filter(|v| !v.is_empty()) {
                record.metadata.insert(name.clone(), value.into());
            }
        }

        Ok(record)
    }

    /// Parse a timestamp in any of the supported formats
    fn parse_timestamp(&self, ts_str: &str) -> SourceResult<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
            return Ok(dt.with_timezone(&Utc));
        }

        let custom = self.timestamp_format.as_deref();
        let formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d",
            "%m/%d/%Y",
            "%Y/%m/%d",
        ];

        for fmt in custom.into_iter().chain(formats) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, fmt) {
                return Ok(dt.and_utc());
            }
            // Date-only values land at noon
            if let Some(dt) = NaiveDate::parse_from_str(ts_str, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(12, 0, 0))
            {
                return Ok(dt.and_utc());
            }
        }

        if let Ok(secs) = ts_str.parse::<i64>() {
            if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                return Ok(dt);
            }
        }

        Err(SourceError::Parse(format!(
            "Could not parse timestamp: {}",
            ts_str
        )))
    }
}

/// Import a CSV file with the detected layout, keeping the last row per id
pub fn import_records_csv(path: &Path) -> SourceResult<Vec<Record>> {
    let result = RecordCsvImporter::new().import(path)?;
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<Record> = Vec::with_capacity(result.records.len());

    // Later rows win on duplicate ids
    for record in result.records {
        match by_id.get(&record.id).copied() {
            Some(pos) => records[pos] = record,
            None => {
                by_id.insert(record.id.clone(), records.len());
                records.push(record);
            }
        }
    }

    Ok(records)
}
