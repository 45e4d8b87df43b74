//! Persistent multi-relation store (SQLite).

pub mod cross_machine;
pub mod schema;
pub mod store;

pub use cross_machine::JoinedSummary;
pub use schema::Relation;
pub use store::{MergeReport, Store};
