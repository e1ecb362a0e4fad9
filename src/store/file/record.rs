//! File-based agent record storage implementation.
//!
//! Stores each record as a pretty-printed JSON file:
//!
//! ```text
//! {registry_dir}/
//!   {record_id}.json
//! ```
//!
//! The registry directory is created lazily on the first save. Saves go
//! through a temp file and an atomic rename so a crashed write never leaves a
//! truncated record behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use crate::agent::AgentRecord;
use crate::store::error::{StorageError, StorageResult};
use crate::store::record::RecordStore;

/// File-based implementation of `RecordStore`.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    registry_dir: PathBuf,
}

impl FileRecordStore {
    /// Create a new file record store.
    ///
    /// The registry directory will be created when the first record is saved.
    pub fn new(registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
        }
    }

    /// Get the file path for a record.
    fn record_path(&self, id: &str) -> PathBuf {
        self.registry_dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn list(&self) -> StorageResult<Vec<AgentRecord>> {
        let mut records = Vec::new();

        let mut entries = match fs::read_dir(&self.registry_dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&self.registry_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::file_io(&self.registry_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let contents = match fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read record file");
                    continue;
                }
            };

            // Skip unparseable records (external edits, partial writes)
            match serde_json::from_str::<AgentRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed record file");
                }
            }
        }

        Ok(records)
    }

    async fn load(&self, id: &str) -> StorageResult<Option<AgentRecord>> {
        let path = self.record_path(id);

        let contents = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };

        let record: AgentRecord = serde_json::from_str(&contents)
            .map_err(|e| StorageError::file_deserialization(&path, e.to_string()))?;

        Ok(Some(record))
    }

    async fn save(&self, record: &AgentRecord) -> StorageResult<()> {
        fs::create_dir_all(&self.registry_dir)
            .await
            .map_err(|e| StorageError::file_io(&self.registry_dir, e))?;

        let final_path = self.record_path(&record.id);
        let temp_path = self.registry_dir.join(format!("{}.json.tmp", record.id));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        // Write to temp file first
        fs::write(&temp_path, json.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&temp_path, e))?;

        // Atomic rename
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| StorageError::file_io(&final_path, e))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let path = self.record_path(id);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::file_io(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(id: &str) -> AgentRecord {
        AgentRecord {
            id: id.to_string(),
            name: format!("agent-{id}"),
            model: "gpt-4.1-mini".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            tools: vec!["web_search".to_string()],
            parent_agent_id: None,
            agent_type: None,
            capabilities: Vec::new(),
            specializations: Vec::new(),
            status: None,
        }
    }

    #[tokio::test]
    async fn list_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileRecordStore::new(tmp.path().join("nonexistent"));

        let records = store.list().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileRecordStore::new(tmp.path().join("agents"));

        let record = sample_record("r1");
        store.save(&record).await.unwrap();

        let loaded = store.load("r1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "r1");
        assert_eq!(loaded.name, "agent-r1");
        assert_eq!(loaded.tools, vec!["web_search".to_string()]);
    }

    #[tokio::test]
    async fn load_missing_record_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileRecordStore::new(tmp.path().join("agents"));

        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites_existing_record() {
        let tmp = TempDir::new().unwrap();
        let store = FileRecordStore::new(tmp.path().join("agents"));

        let mut record = sample_record("r1");
        store.save(&record).await.unwrap();

        record.name = "renamed".to_string();
        store.save(&record).await.unwrap();

        let loaded = store.load("r1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "renamed");

        // No leftover temp file after the rename
        assert!(!tmp.path().join("agents").join("r1.json.tmp").exists());
    }

    #[tokio::test]
    async fn list_skips_malformed_files() {
        let tmp = TempDir::new().unwrap();
        let registry_dir = tmp.path().join("agents");
        std::fs::create_dir(&registry_dir).unwrap();

        let store = FileRecordStore::new(&registry_dir);
        store.save(&sample_record("good")).await.unwrap();

        std::fs::write(registry_dir.join("bad.json"), "{ not json").unwrap();
        std::fs::write(registry_dir.join("notes.txt"), "ignored").unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let tmp = TempDir::new().unwrap();
        let store = FileRecordStore::new(tmp.path().join("agents"));

        store.save(&sample_record("r1")).await.unwrap();

        assert!(store.delete("r1").await.unwrap());
        assert!(!store.delete("r1").await.unwrap());
        assert!(store.load("r1").await.unwrap().is_none());
    }
}
