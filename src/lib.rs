//! BreathFlow - Adaptive Breathing Training Engine
//!
//! Core library for guided breathing training: tracks sessions from
//! creation to completion, adapts per-user timing parameters from
//! comfort feedback and lung-capacity metrics, and maintains rolling
//! progress analytics (capacity score, streak, difficulty tier).

pub mod adaptation;
pub mod analytics;
pub mod breathing;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use adaptation::engine::AdaptationStrategy;
pub use analytics::aggregator::{ProgressAggregator, ProgressReport};
pub use breathing::config::BreathingConfig;
pub use breathing::types::{
    BreathingParameters, ComfortRating, DifficultyLevel, LungCapacityMetric, LungCapacitySample,
    Mode, ProgressAnalytics, Session, SessionUpdate,
};
pub use session::manager::{SessionError, SessionManager};
pub use storage::{BreathingStore, LocalStore, SqliteStore, StoreError};
