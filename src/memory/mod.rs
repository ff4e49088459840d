//! Memory Data Model
//!
//! The records the engine reasons about and the small value types used to
//! select them:
//!
//! - **types**: `Record`, `MemoryCategory`, `TimeRange`, `Timeframe`, `RecordFilter`
//!
//! Records are owned by whatever backend supplied them. The engine only ever
//! reads them and produces new structures that reference a record's id.

pub mod types;

pub use types::{MemoryCategory, Record, RecordFilter, TimeRange, Timeframe};
