//! Derived hierarchy views: tree building and delegation search.
//!
//! The parent/child structure is not a first-class owned tree; it is implied
//! by each record's `parent_agent_id` back-reference. Both traversals take
//! one consistent snapshot of the record set, index it into a
//! parent-to-children multimap, and walk that index in memory. Concurrent
//! registry mutations therefore cannot produce a half-updated tree mid-walk.
//!
//! Records come from uncontrolled external edits (direct file writes,
//! concurrent writers), so the back-references may self-reference or form
//! cycles. Every walk tracks the ids on the current path and stops expanding
//! a branch as soon as an ancestor id reappears, and a hard depth ceiling
//! bounds recursion on pathological data.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::record::AgentRecord;

/// Hard ceiling on traversal depth, over and above the cycle guard.
pub const MAX_TRAVERSAL_DEPTH: usize = 64;

/// Nested tree view of an agent and its descendants.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub children: Vec<TreeNode>,
}

/// A consistent point-in-time index over a flat record set.
pub struct HierarchySnapshot {
    records: HashMap<String, AgentRecord>,
    /// Parent id -> child ids, in enumeration order.
    children: HashMap<String, Vec<String>>,
}

impl HierarchySnapshot {
    /// Index a record set, building the parent-to-children multimap once.
    pub fn new(records: Vec<AgentRecord>) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for record in &records {
            if let Some(ref parent) = record.parent_agent_id {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(record.id.clone());
            }
        }

        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();

        Self { records, children }
    }

    /// Records whose `parent_agent_id` equals `id`, in enumeration order.
    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &AgentRecord> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|child_id| self.records.get(child_id))
    }

    /// Materialize the nested tree rooted at `root_id`, pre-order.
    ///
    /// Returns `None` when the root does not resolve to a record. A child id
    /// already on the current path is treated as childless instead of being
    /// expanded again, so a cyclic record set yields a finite tree.
    pub fn build_tree(&self, root_id: &str) -> Option<TreeNode> {
        let root = self.records.get(root_id)?;
        let mut on_path = HashSet::new();
        Some(self.expand_node(root, &mut on_path, 0))
    }

    fn expand_node<'a>(
        &'a self,
        record: &'a AgentRecord,
        on_path: &mut HashSet<&'a str>,
        depth: usize,
    ) -> TreeNode {
        let mut node = TreeNode {
            id: record.id.clone(),
            name: record.name.clone(),
            model: record.model.clone(),
            agent_type: record.agent_type.clone(),
            status: record.status.clone(),
            children: Vec::new(),
        };

        if depth >= MAX_TRAVERSAL_DEPTH {
            return node;
        }

        on_path.insert(&record.id);
        for child in self.children_of(&record.id) {
            if on_path.contains(child.id.as_str()) {
                // Ancestor reappeared: truncate the branch
                continue;
            }
            node.children.push(self.expand_node(child, on_path, depth + 1));
        }
        on_path.remove(record.id.as_str());

        node
    }

    /// Depth-first pre-order search for the first root-to-node path whose
    /// node matches `task_type`.
    ///
    /// Returns an empty chain when the root does not resolve or no reachable
    /// node matches. First match wins in traversal order - a deep match on an
    /// earlier child branch beats a shallow match on a later sibling.
    pub fn find_delegation_chain(&self, task_type: &str, root_id: &str) -> Vec<String> {
        let Some(root) = self.records.get(root_id) else {
            return Vec::new();
        };

        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        if self.search(root, task_type, &mut path, &mut on_path, 0) {
            path
        } else {
            Vec::new()
        }
    }

    fn search<'a>(
        &'a self,
        record: &'a AgentRecord,
        task_type: &str,
        path: &mut Vec<String>,
        on_path: &mut HashSet<&'a str>,
        depth: usize,
    ) -> bool {
        path.push(record.id.clone());

        if record.matches_task_type(task_type) {
            return true;
        }

        if depth < MAX_TRAVERSAL_DEPTH {
            on_path.insert(&record.id);
            for child in self.children_of(&record.id) {
                if on_path.contains(child.id.as_str()) {
                    continue;
                }
                if self.search(child, task_type, path, on_path, depth + 1) {
                    return true;
                }
            }
            on_path.remove(record.id.as_str());
        }

        path.pop();
        false
    }
}
