//! Agent record data model.

use serde::{Deserialize, Serialize};

use super::error::RegistryError;

/// A persisted agent configuration record.
///
/// Records are flat; the parent/child hierarchy is implicit in the
/// `parent_agent_id` back-reference and is derived on demand. The back
/// reference is not validated at write time: it may dangle, self-reference,
/// or form a cycle, and traversal code must tolerate all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique identifier, generated at creation and never reassigned.
    pub id: String,
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specializations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AgentRecord {
    /// Whether this record matches a delegation task type.
    ///
    /// A record matches when `task_type` equals its `agent_type` or appears
    /// in its `capabilities` or `specializations`.
    pub fn matches_task_type(&self, task_type: &str) -> bool {
        self.agent_type.as_deref() == Some(task_type)
            || self.capabilities.iter().any(|c| c == task_type)
            || self.specializations.iter().any(|s| s == task_type)
    }

    /// Merge a patch into this record.
    ///
    /// Every field present in the patch overwrites the current value; absent
    /// fields are left unchanged. The `id` is never touched, even if the
    /// patch carries one. An empty `parent_agent_id` clears the parent link.
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(system_prompt) = patch.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(tools) = patch.tools {
            self.tools = tools;
        }
        if let Some(parent) = patch.parent_agent_id {
            self.parent_agent_id = if parent.is_empty() {
                None
            } else {
                Some(parent)
            };
        }
        if let Some(agent_type) = patch.agent_type {
            self.agent_type = Some(agent_type);
        }
        if let Some(capabilities) = patch.capabilities {
            self.capabilities = capabilities;
        }
        if let Some(specializations) = patch.specializations {
            self.specializations = specializations;
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
    }
}

/// Fields accepted when creating an agent.
///
/// Absent fields are filled with configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAgent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub parent_agent_id: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateAgent {
    /// Reject malformed fields before anything is persisted.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if let Some(ref name) = self.name
            && name.trim().is_empty()
        {
            return Err(RegistryError::validation("name must not be empty"));
        }
        if let Some(ref model) = self.model
            && model.trim().is_empty()
        {
            return Err(RegistryError::validation("model must not be empty"));
        }
        if let Some(ref system_prompt) = self.system_prompt
            && system_prompt.trim().is_empty()
        {
            return Err(RegistryError::validation("system_prompt must not be empty"));
        }
        if let Some(ref parent) = self.parent_agent_id
            && parent.trim().is_empty()
        {
            return Err(RegistryError::validation(
                "parent_agent_id must not be empty",
            ));
        }
        Ok(())
    }
}

/// Partial field set merged into an existing record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentPatch {
    /// Accepted but ignored: the id of a record can never be overwritten.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    /// Empty string clears the parent link.
    #[serde(default)]
    pub parent_agent_id: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
    #[serde(default)]
    pub specializations: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl AgentPatch {
    /// Reject malformed fields before anything is persisted.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if let Some(ref name) = self.name
            && name.trim().is_empty()
        {
            return Err(RegistryError::validation("name must not be empty"));
        }
        if let Some(ref model) = self.model
            && model.trim().is_empty()
        {
            return Err(RegistryError::validation("model must not be empty"));
        }
        if let Some(ref system_prompt) = self.system_prompt
            && system_prompt.trim().is_empty()
        {
            return Err(RegistryError::validation("system_prompt must not be empty"));
        }
        Ok(())
    }
}
