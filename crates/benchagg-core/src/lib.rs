//! Benchmark result aggregation: loads per-test result records, normalizes
//! them into a persistent multi-relation store, and moves raw run-folders
//! between machines as archives.

pub mod archive;
pub mod batch;
pub mod config;
pub mod errors;
pub mod extract;
pub mod loader;
pub mod model;
pub mod storage;

pub use config::AggregateConfig;
pub use errors::{ArchiveError, BatchError, LoadError, StoreError};
pub use storage::{MergeReport, Relation, Store};
