//! CRUD registry over a pluggable record store.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::config::AgentDefaults;
use crate::store::RecordStore;

use super::error::RegistryError;
use super::hierarchy::{HierarchySnapshot, TreeNode};
use super::record::{AgentPatch, AgentRecord, CreateAgent};

/// Registry of agent records, shared across request handlers.
///
/// All derived views (tree, delegation chain) are recomputed from a fresh
/// `list()` snapshot on every call; nothing is cached across mutations.
#[derive(Clone)]
pub struct AgentRegistry {
    store: Arc<dyn RecordStore>,
    defaults: AgentDefaults,
}

impl AgentRegistry {
    pub fn new(store: Arc<dyn RecordStore>, defaults: AgentDefaults) -> Self {
        Self { store, defaults }
    }

    /// List every persisted record, order unspecified.
    pub async fn list(&self) -> Result<Vec<AgentRecord>, RegistryError> {
        Ok(self.store.list().await?)
    }

    /// Create a record: generate a fresh id, fill defaults, persist.
    pub async fn create(&self, req: CreateAgent) -> Result<AgentRecord, RegistryError> {
        req.validate()?;

        let id = Uuid::new_v4().to_string();
        let record = AgentRecord {
            name: req.name.unwrap_or_else(|| format!("agent-{}", &id[..8])),
            id,
            model: req.model.unwrap_or_else(|| self.defaults.model.clone()),
            system_prompt: req
                .system_prompt
                .unwrap_or_else(|| self.defaults.system_prompt.clone()),
            tools: req.tools,
            parent_agent_id: req.parent_agent_id,
            agent_type: req.agent_type,
            capabilities: req.capabilities,
            specializations: req.specializations,
            status: req.status,
        };

        self.store.save(&record).await?;
        debug!(id = %record.id, name = %record.name, "Created agent record");
        Ok(record)
    }

    /// Get a record by id.
    pub async fn get(&self, id: &str) -> Result<AgentRecord, RegistryError> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))
    }

    /// Merge a partial field set into an existing record and persist it.
    ///
    /// Fields absent from the patch are unchanged; the record's id is never
    /// overwritten even if the patch supplies one.
    pub async fn update(&self, id: &str, patch: AgentPatch) -> Result<AgentRecord, RegistryError> {
        patch.validate()?;

        let mut record = self.get(id).await?;
        record.apply(patch);
        self.store.save(&record).await?;
        debug!(id = %record.id, "Updated agent record");
        Ok(record)
    }

    /// Delete a record outright.
    ///
    /// Returns `true` when a removal occurred; `false` (not an error) when
    /// the record was already absent.
    pub async fn delete(&self, id: &str) -> Result<bool, RegistryError> {
        let removed = self.store.delete(id).await?;
        if removed {
            debug!(id = %id, "Deleted agent record");
        }
        Ok(removed)
    }

    /// Materialize the nested tree view rooted at `root_id`.
    ///
    /// Fails with `NotFound` when the root does not resolve. Cycles and
    /// dangling parents in the underlying records truncate the affected
    /// branch; they never fail the call.
    pub async fn build_tree(&self, root_id: &str) -> Result<TreeNode, RegistryError> {
        let snapshot = HierarchySnapshot::new(self.store.list().await?);
        snapshot
            .build_tree(root_id)
            .ok_or_else(|| RegistryError::not_found(root_id))
    }

    /// Find the first root-to-node path whose node matches `task_type`.
    ///
    /// Returns an empty chain when the root does not resolve or nothing in
    /// the reachable tree matches.
    pub async fn find_delegation_chain(
        &self,
        task_type: &str,
        root_id: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let snapshot = HierarchySnapshot::new(self.store.list().await?);
        Ok(snapshot.find_delegation_chain(task_type, root_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::file::FileRecordStore;
    use tempfile::TempDir;

    fn test_registry(tmp: &TempDir) -> AgentRegistry {
        let store = FileRecordStore::new(tmp.path().join("agents"));
        AgentRegistry::new(Arc::new(store), AgentDefaults::default())
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let record = registry.create(CreateAgent::default()).await.unwrap();

        assert_eq!(record.name, format!("agent-{}", &record.id[..8]));
        assert_eq!(record.model, "gpt-4.1-mini");
        assert_eq!(record.system_prompt, "You are a helpful assistant.");
        assert!(record.tools.is_empty());
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let created = registry
            .create(CreateAgent {
                name: Some("researcher".to_string()),
                agent_type: Some("research".to_string()),
                capabilities: vec!["search".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        let fetched = registry.get(&created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "researcher");
        assert_eq!(fetched.agent_type.as_deref(), Some("research"));
        assert_eq!(fetched.capabilities, vec!["search".to_string()]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let result = registry.get("missing").await;
        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_preserves_id() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let created = registry.create(CreateAgent::default()).await.unwrap();
        let updated = registry
            .update(
                &created.id,
                AgentPatch {
                    id: Some("forged-id".to_string()),
                    name: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "renamed");

        // The merge was persisted under the original id
        let fetched = registry.get(&created.id).await.unwrap();
        assert_eq!(fetched.name, "renamed");
        assert!(registry.get("forged-id").await.is_err());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let result = registry.update("missing", AgentPatch::default()).await;
        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_rejects_blank_name_before_write() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let created = registry
            .create(CreateAgent {
                name: Some("keep-me".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let result = registry
            .update(
                &created.id,
                AgentPatch {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));

        // Nothing was persisted
        assert_eq!(registry.get(&created.id).await.unwrap().name, "keep-me");
    }

    #[tokio::test]
    async fn delete_twice_reports_true_then_false() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let created = registry.create(CreateAgent::default()).await.unwrap();

        assert!(registry.delete(&created.id).await.unwrap());
        assert!(!registry.delete(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn build_tree_missing_root_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let result = registry.build_tree("missing").await;
        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delegation_chain_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let registry = test_registry(&tmp);

        let chain = registry
            .find_delegation_chain("anything", "missing")
            .await
            .unwrap();
        assert!(chain.is_empty());
    }
}
