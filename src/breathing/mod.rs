//! Breathing protocol domain: modes, timing parameters, sessions,
//! lung-capacity metrics, and per-mode defaults.

pub mod config;
pub mod types;

// Re-exports for convenience
pub use config::{load_config, save_config, BreathingConfig, ConfigError, ModeDefaults};
pub use types::{
    BreathingParameters, ComfortRating, DifficultyLevel, LungCapacityMetric, LungCapacitySample,
    Mode, ProgressAnalytics, Session, SessionUpdate, Timings,
};
