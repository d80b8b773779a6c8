//! Storage module: the shared store interface and its two backends.

pub mod database;
pub mod local_store;
pub mod schema;
pub mod sqlite_store;
pub mod store;

pub use database::Database;
pub use local_store::LocalStore;
pub use sqlite_store::SqliteStore;
pub use store::{BreathingStore, MetricAverages, StoreError};
