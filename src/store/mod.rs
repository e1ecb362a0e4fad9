//! Storage abstraction layer.
//!
//! This module defines trait interfaces for persistence operations, with
//! file-based implementations provided in the `file` submodule.
//!
//! # Naming Conventions
//!
//! - `list` - enumerate all entities
//! - `load` - read a single entity, returns `Option` if not found
//! - `save` - create or update (upsert semantics, must be atomic)
//! - `delete` - remove an entity

pub mod error;

mod record;

pub mod file;

pub use error::{StorageError, StorageResult};
pub use record::RecordStore;
