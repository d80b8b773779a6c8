//! Progress analytics: capacity scoring, streak tracking, and the
//! aggregator that rebuilds the per-user summary record.

pub mod aggregator;
pub mod capacity;
pub mod streak;

pub use aggregator::{ProgressAggregator, ProgressReport};
pub use capacity::{capacity_score, difficulty_for};
pub use streak::consecutive_days;
