//! Agent registry types and operations.
//!
//! This module owns the `AgentRecord` data model, the CRUD registry over a
//! pluggable `RecordStore`, and the derived hierarchy views (tree building
//! and delegation search).

mod error;
mod hierarchy;
mod record;
mod registry;

pub use error::RegistryError;
pub use hierarchy::{HierarchySnapshot, TreeNode, MAX_TRAVERSAL_DEPTH};
pub use record::{AgentPatch, AgentRecord, CreateAgent};
pub use registry::AgentRegistry;
