//! Agent record storage trait.
//!
//! Defines the interface for persisting agent configuration records.

use async_trait::async_trait;

use crate::agent::AgentRecord;

use super::error::StorageResult;

/// Storage interface for agent record persistence.
///
/// Each record is keyed by its `id`. Operations are atomic per record; the
/// store offers no cross-record transactions, so concurrent writers to the
/// same id race and the last write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List all records.
    ///
    /// Order is unspecified (filesystem enumeration order for the file
    /// backend). Records that fail to parse are skipped with a warning.
    async fn list(&self) -> StorageResult<Vec<AgentRecord>>;

    /// Load a record by id.
    ///
    /// Returns `Ok(None)` if the record doesn't exist.
    async fn load(&self, id: &str) -> StorageResult<Option<AgentRecord>>;

    /// Create or update a record (upsert semantics).
    ///
    /// Must be atomic - either fully succeeds or has no effect.
    async fn save(&self, record: &AgentRecord) -> StorageResult<()>;

    /// Delete a record.
    ///
    /// Returns `true` if a record was removed, `false` if it was absent.
    async fn delete(&self, id: &str) -> StorageResult<bool>;
}
