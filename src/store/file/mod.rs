//! File-based storage implementations.

mod record;

pub use record::FileRecordStore;
